use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::model::{ClockWindow, Sec, ShiftSchedule, Slot, Span, VenueInfo};

use super::window;

/// Per-venue clipping windows for one report: the working window plus the
/// three *effective* shift windows, each already intersected with the
/// working window. A shift whose intersection is empty stays `None`, so its
/// slot can never receive a booking — it is absent, not coincidentally
/// clipped to nothing.
#[derive(Debug, Clone, Copy)]
pub struct VenuePlan {
    pub work: ClockWindow,
    pub shifts: [Option<ClockWindow>; 3],
}

impl VenuePlan {
    pub fn build(venue: &VenueInfo, shifts: &ShiftSchedule) -> Self {
        let work = window::work_window(venue);
        Self {
            work,
            shifts: [
                work.clip(&shifts.morning),
                work.clip(&shifts.day),
                work.clip(&shifts.evening),
            ],
        }
    }

    /// Slot/window pairs, `Whole` first; empty shifts are skipped.
    pub fn slot_windows(&self) -> impl Iterator<Item = (Slot, ClockWindow)> + '_ {
        [
            (Slot::Whole, Some(self.work)),
            (Slot::Morning, self.shifts[0]),
            (Slot::Day, self.shifts[1]),
            (Slot::Evening, self.shifts[2]),
        ]
        .into_iter()
        .filter_map(|(slot, w)| w.map(|w| (slot, w)))
    }

    /// Capacity of one slot for a single day, in seconds.
    pub fn slot_seconds(&self, slot: Slot) -> Sec {
        let window = match slot {
            Slot::Whole => Some(self.work),
            Slot::Morning => self.shifts[0],
            Slot::Day => self.shifts[1],
            Slot::Evening => self.shifts[2],
        };
        window.map_or(0, |w| w.seconds())
    }
}

/// Clip one booking against every window of one calendar day. Each non-empty
/// intersection is emitted independently: a booking spanning two shifts
/// contributes its full clipped portion to both, on top of the whole-window
/// cut.
pub fn clip_day(
    plan: &VenuePlan,
    day: NaiveDate,
    tz: Tz,
    booking: Span,
    out: &mut Vec<(Slot, Span)>,
) {
    for (slot, window) in plan.slot_windows() {
        if let Some(abs) = window::day_span(day, &window, tz)
            && let Some(clipped) = abs.clip(&booking)
        {
            out.push((slot, clipped));
        }
    }
}
