use crate::model::{Sec, Span};

/// One clipped booking portion inside a bucket: an absolute span plus the
/// fraction of the venue it occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weighted {
    pub span: Span,
    pub weight: f64,
}

/// Occupied wall-clock seconds for one bucket of weighted intervals.
///
/// Sweep-line over signed start/end events: between consecutive event
/// instants the summed weight is clamped to [0, 1] before being multiplied
/// by the elapsed time, so simultaneous fractional bookings add up but the
/// result can never exceed the bucket's wall-clock duration. Fractional
/// seconds are truncated.
pub fn occupied_seconds(intervals: &[Weighted]) -> Sec {
    let mut events: Vec<(Sec, f64)> = Vec::with_capacity(intervals.len() * 2);
    for w in intervals {
        if w.span.end <= w.span.start || w.weight <= 0.0 {
            continue;
        }
        events.push((w.span.start, w.weight));
        events.push((w.span.end, -w.weight));
    }
    if events.is_empty() {
        return 0;
    }
    // Ties in instant may land in any order: deltas at the same instant are
    // all applied before the next segment is measured.
    events.sort_by_key(|e| e.0);

    let mut occupied = 0.0_f64;
    let mut current = 0.0_f64;
    let mut prev = events[0].0;
    for (instant, delta) in events {
        if instant > prev {
            occupied += current.clamp(0.0, 1.0) * (instant - prev) as f64;
            prev = instant;
        }
        current += delta;
    }
    occupied as Sec
}
