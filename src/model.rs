use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix seconds — the only absolute time scalar.
pub type Sec = i64;

/// Half-open absolute interval `[start, end)` in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Sec,
    pub end: Sec,
}

impl Span {
    pub fn new(start: Sec, end: Sec) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_sec(&self) -> Sec {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection of two spans, or `None` when the overlap is empty.
    pub fn clip(&self, other: &Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then(|| Span::new(start, end))
    }
}

/// Wall-clock window `[start, end)` on an arbitrary reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ClockWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        debug_assert!(start < end, "ClockWindow start must be before end");
        Self { start, end }
    }

    /// Window length in whole seconds. Callers pass ordered pairs.
    pub fn seconds(&self) -> Sec {
        debug_assert!(self.start <= self.end, "ClockWindow is reversed");
        self.end.num_seconds_from_midnight() as Sec
            - self.start.num_seconds_from_midnight() as Sec
    }

    /// Intersection of two wall-clock windows, or `None` when empty.
    pub fn clip(&self, other: &ClockWindow) -> Option<ClockWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then(|| ClockWindow::new(start, end))
    }
}

/// Infallible constructor for wall-clock literals.
pub(crate) fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).expect("valid wall-clock literal")
}

/// What kind of booking occupies a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    /// Long-term or ad-hoc tenant rental.
    Pd,
    /// State-mandated recurring coaching-group session.
    Gz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A bookable subdivision of a venue. The code prefix carries the fraction:
/// "Q*" is a quarter, "H*" a half, anything else the whole venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueUnit {
    pub id: Ulid,
    pub venue_id: Ulid,
    pub code: String,
    pub active: bool,
}

/// One venue joined with its organization's working-hours configuration, as
/// handed to the engine by the store. Working hours belong to the
/// organization; missing hours fall back to a default window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueInfo {
    pub id: Ulid,
    pub name: String,
    pub organization_id: Ulid,
    pub organization_name: String,
    pub work_start: Option<NaiveTime>,
    pub work_end: Option<NaiveTime>,
    pub open_24h: bool,
}

/// Read-only booking snapshot for one aggregation run. The engine never
/// mutates these; `unit_code` of `None` means the whole venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBooking {
    pub venue_id: Ulid,
    pub unit_code: Option<String>,
    pub activity: Activity,
    pub status: BookingStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl RawBooking {
    /// Absolute span of the booking, or `None` for a degenerate range.
    pub fn span(&self) -> Option<Span> {
        (self.starts_at < self.ends_at)
            .then(|| Span::new(self.starts_at.timestamp(), self.ends_at.timestamp()))
    }
}

/// The three reporting shifts of a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    pub morning: ClockWindow,
    pub day: ClockWindow,
    pub evening: ClockWindow,
}

impl Default for ShiftSchedule {
    /// 08:00–12:00 / 12:00–18:00 / 18:00–22:00.
    fn default() -> Self {
        Self {
            morning: ClockWindow::new(hms(8, 0, 0), hms(12, 0, 0)),
            day: ClockWindow::new(hms(12, 0, 0), hms(18, 0, 0)),
            evening: ClockWindow::new(hms(18, 0, 0), hms(22, 0, 0)),
        }
    }
}

/// Reporting bucket within a day: the whole working window or one shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Whole,
    Morning,
    Day,
    Evening,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::Whole => 0,
            Slot::Morning => 1,
            Slot::Day => 2,
            Slot::Evening => 3,
        }
    }
}

/// Capacity/occupancy triad for one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotUsage {
    pub capacity_sec: Sec,
    pub pd_sec: Sec,
    pub gz_sec: Sec,
}

impl SlotUsage {
    pub fn occupied_sec(&self) -> Sec {
        self.pd_sec + self.gz_sec
    }

    /// Occupied share of capacity; 0.0 when there is no capacity.
    pub fn ratio(&self) -> f64 {
        if self.capacity_sec <= 0 {
            0.0
        } else {
            self.occupied_sec() as f64 / self.capacity_sec as f64
        }
    }
}

/// One venue's aggregate over the report period: the whole-window triad plus
/// one triad per shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRow {
    pub venue_id: Ulid,
    pub venue_name: String,
    pub organization_id: Ulid,
    pub organization_name: String,
    pub total: SlotUsage,
    pub morning: SlotUsage,
    pub day: SlotUsage,
    pub evening: SlotUsage,
}

impl UsageRow {
    /// Overall occupied share of the working window. Reports are sorted by
    /// this, descending.
    pub fn utilization(&self) -> f64 {
        self.total.ratio()
    }
}
