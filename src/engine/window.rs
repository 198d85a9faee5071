use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::model::{ClockWindow, Sec, Span, VenueInfo, hms};

/// Working window for a venue: the full day in 24h mode, otherwise the
/// owning organization's configured hours. Missing or inverted hours fall
/// back to 08:00–22:00 rather than failing the report.
pub fn work_window(venue: &VenueInfo) -> ClockWindow {
    if venue.open_24h {
        return ClockWindow::new(hms(0, 0, 0), hms(23, 59, 59));
    }
    match (venue.work_start, venue.work_end) {
        (Some(start), Some(end)) if start < end => ClockWindow::new(start, end),
        _ => {
            tracing::warn!(venue = %venue.id, "unusable working hours, using fallback window");
            ClockWindow::new(hms(8, 0, 0), hms(22, 0, 0))
        }
    }
}

/// Resolve a local date + wall-clock time to an absolute instant. `None`
/// when the wall-clock time does not exist on that day (DST gap); ambiguous
/// times resolve to the earliest instant.
pub fn local_instant(day: NaiveDate, time: NaiveTime, tz: Tz) -> Option<Sec> {
    tz.from_local_datetime(&day.and_time(time))
        .earliest()
        .map(|dt| dt.timestamp())
}

/// A wall-clock window on a specific day as an absolute span, or `None`
/// when either bound is unresolvable or the resolved range is empty.
pub fn day_span(day: NaiveDate, window: &ClockWindow, tz: Tz) -> Option<Span> {
    let start = local_instant(day, window.start, tz)?;
    let end = local_instant(day, window.end, tz)?;
    (start < end).then(|| Span::new(start, end))
}

/// Local midnight of `day` as an absolute instant. The naive UTC reading is
/// the fallback for the rare zones where midnight sits in a DST gap.
pub fn local_midnight(day: NaiveDate, tz: Tz) -> Sec {
    let naive = day.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.timestamp(),
        None => naive.and_utc().timestamp(),
    }
}

/// Absolute fetch range for an inclusive day range: `start_day`'s midnight
/// up to the midnight after `end_day`.
pub fn range_span(start_day: NaiveDate, end_day: NaiveDate, tz: Tz) -> Span {
    debug_assert!(start_day <= end_day, "range_span days are reversed");
    let start = local_midnight(start_day, tz);
    let after = end_day.succ_opt().expect("end day validated at entry");
    Span::new(start, local_midnight(after, tz))
}
