use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Berlin;
use ulid::Ulid;

use auslast::engine::{Engine, ReportParams};
use auslast::model::{Activity, ShiftSchedule, SlotUsage, UsageRow};
use auslast::store::{InMemoryStore, Organization};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn berlin(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Berlin
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn assert_occupancy_within_capacity(row: &UsageRow) {
    for slot in [&row.total, &row.morning, &row.day, &row.evening] {
        assert!(slot.pd_sec <= slot.capacity_sec, "PD exceeds capacity: {slot:?}");
        assert!(slot.gz_sec <= slot.capacity_sec, "GZ exceeds capacity: {slot:?}");
        assert!(slot.pd_sec >= 0 && slot.gz_sec >= 0);
    }
}

/// A realistic week: one venue on regular hours with half-unit training
/// sessions and weekend rentals, one 24h venue, reported Mon–Sun in a
/// timezone two hours off UTC.
#[tokio::test]
async fn weekly_report_across_two_organizations() {
    let store = InMemoryStore::new();

    let nord = Ulid::new();
    store
        .create_organization(Organization {
            id: nord,
            name: "TSV Nord".into(),
            work_start: Some(t(8, 0)),
            work_end: Some(t(22, 0)),
            open_24h: false,
        })
        .unwrap();
    let halle_nord = Ulid::new();
    store.create_venue(halle_nord, nord, "Sporthalle Nord").unwrap();
    let h1 = Ulid::new();
    store.create_unit(h1, halle_nord, "H1").await.unwrap();
    store.create_unit(Ulid::new(), halle_nord, "H2").await.unwrap();

    let west = Ulid::new();
    store
        .create_organization(Organization {
            id: west,
            name: "SC West".into(),
            work_start: None,
            work_end: None,
            open_24h: true,
        })
        .unwrap();
    let halle_west = Ulid::new();
    store.create_venue(halle_west, west, "Halle West").unwrap();

    // Coaching group on H1, Mon–Fri 17:00–19:00 local.
    for day in 6..=10 {
        store
            .record_booking(
                Ulid::new(),
                halle_nord,
                Some(h1),
                Activity::Gz,
                berlin(2024, 5, day, 17, 0),
                berlin(2024, 5, day, 19, 0),
            )
            .await
            .unwrap();
    }
    // Whole-venue weekend rentals 10:00–12:00.
    for day in [11, 12] {
        store
            .record_booking(
                Ulid::new(),
                halle_nord,
                None,
                Activity::Pd,
                berlin(2024, 5, day, 10, 0),
                berlin(2024, 5, day, 12, 0),
            )
            .await
            .unwrap();
    }
    // One six-hour rental at the 24h venue.
    store
        .record_booking(
            Ulid::new(),
            halle_west,
            None,
            Activity::Pd,
            berlin(2024, 5, 8, 9, 0),
            berlin(2024, 5, 8, 15, 0),
        )
        .await
        .unwrap();

    let engine = Engine::new(store);
    let rows = engine
        .usage_report(&ReportParams {
            start_day: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            end_day: NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(),
            tz: Berlin,
            organization: None,
            include_cancelled: false,
            shifts: ShiftSchedule::default(),
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_occupancy_within_capacity(row);
    }

    // Nord is the busier venue and sorts first.
    assert_eq!(rows[0].venue_name, "Sporthalle Nord");
    let nord_row = &rows[0];
    let west_row = &rows[1];

    // 14h window × 7 days; the default shifts all sit inside it, so shift
    // capacities add back up to the whole.
    assert_eq!(nord_row.total.capacity_sec, 7 * 14 * 3600);
    assert_eq!(
        nord_row.morning.capacity_sec + nord_row.day.capacity_sec + nord_row.evening.capacity_sec,
        nord_row.total.capacity_sec
    );

    // GZ: five sessions × 2h × weight 0.5.
    assert_eq!(
        nord_row.total,
        SlotUsage {
            capacity_sec: 7 * 14 * 3600,
            pd_sec: 2 * 7200,
            gz_sec: 5 * 3600,
        }
    );
    // The 17:00–19:00 sessions straddle the day/evening boundary at 18:00.
    assert_eq!(nord_row.day.gz_sec, 5 * 1800);
    assert_eq!(nord_row.evening.gz_sec, 5 * 1800);
    // The weekend rentals sit fully in the morning shift.
    assert_eq!(nord_row.morning.pd_sec, 2 * 7200);
    assert_eq!(nord_row.morning.gz_sec, 0);

    assert_eq!(west_row.venue_name, "Halle West");
    assert_eq!(west_row.total.capacity_sec, 7 * 86_399);
    assert_eq!(west_row.total.pd_sec, 6 * 3600);
    // 09:00–15:00 local: three morning hours, three day hours.
    assert_eq!(west_row.morning.pd_sec, 3 * 3600);
    assert_eq!(west_row.day.pd_sec, 3 * 3600);
    assert_eq!(west_row.evening.pd_sec, 0);

    assert!(nord_row.utilization() > west_row.utilization());
}

/// Custom shift windows flow through end to end.
#[tokio::test]
async fn custom_shift_schedule() {
    let store = InMemoryStore::new();
    let org = Ulid::new();
    store
        .create_organization(Organization {
            id: org,
            name: "SV Süd".into(),
            work_start: Some(t(6, 0)),
            work_end: Some(t(23, 0)),
            open_24h: false,
        })
        .unwrap();
    let venue = Ulid::new();
    store.create_venue(venue, org, "Halle Süd").unwrap();
    store
        .record_booking(
            Ulid::new(),
            venue,
            None,
            Activity::Gz,
            berlin(2024, 5, 6, 6, 30),
            berlin(2024, 5, 6, 7, 30),
        )
        .await
        .unwrap();

    let engine = Engine::new(store);
    let rows = engine
        .usage_report(&ReportParams {
            start_day: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            end_day: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            tz: Berlin,
            organization: None,
            include_cancelled: false,
            shifts: ShiftSchedule {
                morning: auslast::model::ClockWindow::new(t(6, 0), t(10, 0)),
                day: auslast::model::ClockWindow::new(t(10, 0), t(16, 0)),
                evening: auslast::model::ClockWindow::new(t(16, 0), t(23, 0)),
            },
        })
        .await
        .unwrap();

    let row = &rows[0];
    assert_eq!(row.morning.capacity_sec, 4 * 3600);
    assert_eq!(row.morning.gz_sec, 3600);
    assert_eq!(row.evening.capacity_sec, 7 * 3600);
    assert_occupancy_within_capacity(row);
}
