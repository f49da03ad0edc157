//! Stored entities read back exactly as written.

use crate::test_utils::*;
use proptest::prelude::*;
use serde_json::json;
use sportsdb::{EntityKind, SportsDb, SportsDbConfig, StartTime};

#[test]
fn test_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = SportsDbConfig::default().with_snapshot_path(dir.path().join("sports.json"));

    let (s, e, sel) = {
        let db = SportsDb::open(config.clone()).unwrap();
        let s = sport(&db, "Snooker");
        let e = event(&db, s, "Masters Final");
        let sel = selection(&db, e, "Player B");
        db.deactivate(EntityKind::Selection, sel).unwrap();
        db.flush().unwrap();
        (
            load_sport(&db, s),
            load_event(&db, e),
            load_selection(&db, sel),
        )
    };

    let db = SportsDb::open(config).unwrap();
    assert_eq!(load_sport(&db, s.id), s);
    assert_eq!(load_event(&db, e.id), e);
    assert_eq!(load_selection(&db, sel.id), sel);
    assert!(!e.active);
    assert!(!s.active);
}

#[test]
fn test_explicit_actual_start_round_trips() {
    let db = db();
    let e = event(&db, sport(&db, "Cycling"), "Stage 1");
    let updated = as_event(
        db.update(
            EntityKind::Event,
            e,
            json!({"status": "STARTED", "actual_start": "2030-06-01T12:00:00.123456789Z"}),
        )
        .unwrap(),
    );
    let Some(StartTime::At(ts)) = updated.actual_start else {
        panic!("Expected a start time, got {:?}", updated.actual_start);
    };
    // Nanoseconds are truncated to microseconds.
    assert_eq!(ts.timestamp_subsec_micros(), 123_456);
    assert_eq!(ts.timestamp_subsec_nanos(), 123_456_000);
    assert_eq!(load_event(&db, e), updated);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_selection_round_trip(
        name in "[A-Za-z0-9][A-Za-z0-9 .'-]{0,30}",
        price in 0.0f64..10_000.0,
        outcome in 0i64..4,
        active in any::<bool>(),
    ) {
        let db = db();
        let e = event(&db, sport(&db, "Prop"), "Prop Event");
        let created = db
            .create(
                EntityKind::Selection,
                json!({"name": name, "event": e.as_u64(), "price": price, "outcome": outcome, "active": active}),
            )
            .unwrap();
        let fetched = db.get(EntityKind::Selection, created.id()).unwrap();
        prop_assert_eq!(&created, &fetched);

        let selection = as_selection(fetched);
        prop_assert_eq!(selection.name, name);
        prop_assert_eq!(selection.outcome.value(), outcome);
        prop_assert_eq!(selection.active, active);
        prop_assert!((selection.price - price).abs() <= 0.005 + 1e-9);
    }

    #[test]
    fn prop_event_times_round_trip(offset_micros in 1_000_000i64..10_000_000_000_000) {
        let db = db();
        let s = sport(&db, "Prop");
        let start = (chrono::Utc::now().timestamp_micros() + offset_micros) as f64 / 1e6;
        let created = db
            .create(
                EntityKind::Event,
                json!({"name": "Timed", "type": 1, "status": 0, "sport": s.as_u64(), "scheduled_start": start}),
            )
            .unwrap();
        let fetched = db.get(EntityKind::Event, created.id()).unwrap();
        prop_assert_eq!(&created, &fetched);
        prop_assert_eq!(as_event(fetched).actual_start, Some(StartTime::NotStarted));
    }
}
