use std::collections::HashMap;
use std::time::Instant;

use chrono::NaiveDate;
use chrono_tz::Tz;
use ulid::Ulid;

use crate::limits::*;
use crate::model::{Activity, Sec, ShiftSchedule, Slot, SlotUsage, UsageRow};
use crate::observability;
use crate::store::VenueStore;

use super::clip::{VenuePlan, clip_day};
use super::fraction::fraction_for_unit_code;
use super::occupancy::{Weighted, occupied_seconds};
use super::window;
use super::{Engine, EngineError};

/// One usage-report request. Days are inclusive calendar dates interpreted
/// in `tz`.
#[derive(Debug, Clone)]
pub struct ReportParams {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    pub tz: Tz,
    /// Restrict the report to one organization's venues.
    pub organization: Option<Ulid>,
    pub include_cancelled: bool,
    pub shifts: ShiftSchedule,
}

/// Accumulation key: one venue, one day, one activity, one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BucketKey {
    venue: Ulid,
    day: NaiveDate,
    activity: Activity,
    slot: Slot,
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotAcc {
    pd: Sec,
    gz: Sec,
}

/// All validation happens here, at the single entry point.
fn validate(params: &ReportParams) -> Result<i64, EngineError> {
    if params.end_day < params.start_day {
        return Err(EngineError::InvalidRange {
            start: params.start_day,
            end: params.end_day,
        });
    }
    if params.end_day.succ_opt().is_none() {
        return Err(EngineError::LimitExceeded("end day out of range"));
    }
    let days = (params.end_day - params.start_day).num_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(EngineError::LimitExceeded("report range too wide"));
    }
    for (name, w) in [
        ("morning", &params.shifts.morning),
        ("day", &params.shifts.day),
        ("evening", &params.shifts.evening),
    ] {
        if w.end <= w.start {
            return Err(EngineError::InvalidShift { shift: name, window: *w });
        }
    }
    Ok(days)
}

impl<S: VenueStore> Engine<S> {
    /// Compute per-venue utilization rows for an inclusive day range.
    ///
    /// Every fetched venue gets a row, bookings or not. Rows are sorted by
    /// descending overall utilization; zero-capacity rows count as ratio 0
    /// and sort last.
    pub async fn usage_report(&self, params: &ReportParams) -> Result<Vec<UsageRow>, EngineError> {
        let days = validate(params)?;
        let started = Instant::now();

        let venues = self
            .store()
            .fetch_venues(params.organization)
            .await
            .map_err(EngineError::Store)?;

        let plans: HashMap<Ulid, VenuePlan> = venues
            .iter()
            .map(|v| (v.id, VenuePlan::build(v, &params.shifts)))
            .collect();
        let venue_ids: Vec<Ulid> = venues.iter().map(|v| v.id).collect();

        let range = window::range_span(params.start_day, params.end_day, params.tz);
        let bookings = self
            .store()
            .fetch_bookings_overlapping(&venue_ids, range, params.include_cancelled)
            .await
            .map_err(EngineError::Store)?;

        // Bucket every booking's clipped portions per venue/day/activity/slot.
        let mut buckets: HashMap<BucketKey, Vec<Weighted>> = HashMap::new();
        let mut cuts = Vec::new();
        let mut skipped = 0u64;
        for booking in &bookings {
            let Some(plan) = plans.get(&booking.venue_id) else {
                // Race between the venue and booking listings; drop the
                // booking, not the report.
                tracing::warn!(venue = %booking.venue_id, "booking references unknown venue, skipped");
                skipped += 1;
                continue;
            };
            let Some(span) = booking.span() else { continue };
            let weight = fraction_for_unit_code(booking.unit_code.as_deref());
            for day in params.start_day.iter_days().take(days as usize) {
                cuts.clear();
                clip_day(plan, day, params.tz, span, &mut cuts);
                for &(slot, clipped) in &cuts {
                    buckets
                        .entry(BucketKey {
                            venue: booking.venue_id,
                            day,
                            activity: booking.activity,
                            slot,
                        })
                        .or_default()
                        .push(Weighted { span: clipped, weight });
                }
            }
        }
        if skipped > 0 {
            metrics::counter!(observability::BOOKINGS_SKIPPED_TOTAL).increment(skipped);
        }

        // Sweep each bucket independently, then fold into per-venue totals.
        let mut totals: HashMap<Ulid, [SlotAcc; 4]> = HashMap::new();
        for (key, intervals) in &buckets {
            // Capacity is nominal wall-clock; DST fall-back days run an hour
            // longer, so a day's occupancy is capped at the slot's nominal
            // length.
            let occupied =
                occupied_seconds(intervals).min(plans[&key.venue].slot_seconds(key.slot));
            let acc = &mut totals.entry(key.venue).or_default()[key.slot.index()];
            match key.activity {
                Activity::Pd => acc.pd += occupied,
                Activity::Gz => acc.gz += occupied,
            }
        }

        let mut rows: Vec<UsageRow> = venues
            .iter()
            .map(|v| {
                let plan = &plans[&v.id];
                let acc = totals.get(&v.id).copied().unwrap_or_default();
                let usage = |slot: Slot| SlotUsage {
                    capacity_sec: plan.slot_seconds(slot) * days,
                    pd_sec: acc[slot.index()].pd,
                    gz_sec: acc[slot.index()].gz,
                };
                UsageRow {
                    venue_id: v.id,
                    venue_name: v.name.clone(),
                    organization_id: v.organization_id,
                    organization_name: v.organization_name.clone(),
                    total: usage(Slot::Whole),
                    morning: usage(Slot::Morning),
                    day: usage(Slot::Day),
                    evening: usage(Slot::Evening),
                }
            })
            .collect();

        rows.sort_by(|a, b| b.utilization().total_cmp(&a.utilization()));

        metrics::counter!(observability::REPORTS_TOTAL).increment(1);
        metrics::histogram!(observability::REPORT_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        metrics::histogram!(observability::REPORT_BOOKINGS).record(bookings.len() as f64);
        tracing::debug!(
            venues = rows.len(),
            bookings = bookings.len(),
            days,
            "usage report assembled"
        );

        Ok(rows)
    }
}
