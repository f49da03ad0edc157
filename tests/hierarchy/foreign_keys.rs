//! Reference checks.

use std::sync::Arc;

use crate::test_utils::*;
use serde_json::json;
use sportsdb::{Database, EntityId, EntityKind, Error, KvStore, MemoryStore, SportsDb, SportsDbConfig};

fn db_over(store: &Arc<MemoryStore>) -> SportsDb {
    let db = Database::with_store(store.clone(), SportsDbConfig::default()).unwrap();
    SportsDb::from_database(db).unwrap()
}

#[test]
fn test_event_with_missing_sport_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let db = db_over(&store);
    let before = store.len();

    let err = db
        .create(
            EntityKind::Event,
            json!({"name": "Orphan", "type": 0, "status": 0, "sport": 424242, "scheduled_start": future_start()}),
        )
        .unwrap_err();

    assert_eq!(
        err,
        Error::DanglingReference {
            kind: "event".into(),
            field: "sport".into(),
            target: "sport".into(),
            id: "424242".into(),
        }
    );
    assert_eq!(store.len(), before);
    assert!(store.keys("event:*").unwrap().is_empty());
}

#[test]
fn test_selection_with_missing_event() {
    let db = db();
    let err = db
        .create(
            EntityKind::Selection,
            json!({"name": "Orphan", "event": 7, "price": 1.0, "outcome": 0}),
        )
        .unwrap_err();
    assert!(matches!(err, Error::DanglingReference { ref field, .. } if field == "event"));
}

#[test]
fn test_reference_must_point_at_the_right_kind() {
    let db = db();
    let s = sport(&db, "Handball");
    // A sport id is not an event id.
    let err = db
        .create(
            EntityKind::Selection,
            json!({"name": "Wrong", "event": s.as_u64(), "price": 1.0, "outcome": 0}),
        )
        .unwrap_err();
    assert!(matches!(err, Error::DanglingReference { .. }));
}

#[test]
fn test_parent_cannot_change_through_update() {
    let db = db();
    let a = sport(&db, "Baseball");
    let b = sport(&db, "Softball");
    let e = event(&db, a, "World Series");

    for target in [b.as_u64(), 1] {
        let err = db
            .update(EntityKind::Event, e, json!({"sport": target}))
            .unwrap_err();
        assert!(
            matches!(err, Error::Validation { ref violations, .. } if violations[0].starts_with("sport:")),
            "unexpected {err:?}"
        );
    }
    assert_eq!(load_event(&db, e).sport, a);
    assert_eq!(load_sport(&db, a).events, vec![e]);
    assert!(load_sport(&db, b).events.is_empty());

    // The hierarchy is intact: deactivating the event reaches its own sport only.
    db.deactivate(EntityKind::Event, e).unwrap();
    assert!(!load_sport(&db, a).active);
    assert!(load_sport(&db, b).active);
}

#[test]
fn test_selection_stays_under_its_event() {
    let db = db();
    let s = sport(&db, "Athletics");
    let e1 = event(&db, s, "100m");
    let e2 = event(&db, s, "200m");
    let sel = selection(&db, e1, "Runner");

    let err = db
        .update(EntityKind::Selection, sel, json!({"event": e2.as_u64()}))
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(load_selection(&db, sel).event, e1);

    // Unchanged parent values pass through.
    let renamed = db
        .update(EntityKind::Selection, sel, json!({"event": e1.as_u64(), "name": "Sprinter"}))
        .unwrap();
    assert_eq!(renamed.entity.name(), "Sprinter");
}

#[test]
fn test_collection_cannot_adopt_another_parents_child() {
    let db = db();
    let a = sport(&db, "Rowing");
    let b = sport(&db, "Canoeing");
    let e = event(&db, a, "Boat Race");

    let err = db
        .update(EntityKind::Sport, b, json!({"events": [e.as_u64()]}))
        .unwrap_err();
    match err {
        Error::Validation { violations, .. } => {
            assert_eq!(violations, [format!("events: event {e} belongs to another sport")]);
        }
        other => panic!("Expected Validation, got {other:?}"),
    }
    assert!(load_sport(&db, b).events.is_empty());

    // Listing a child again under its own parent is still accepted.
    let same = db
        .update(EntityKind::Sport, a, json!({"events": [e.as_u64()]}))
        .unwrap();
    assert_eq!(as_sport(same).events, vec![e]);
}

#[test]
fn test_collection_ids_are_checked() {
    let db = db();
    let s = sport(&db, "Volleyball");
    let err = db
        .update(EntityKind::Sport, s, json!({"events": [EntityId::from_raw(3).as_u64()]}))
        .unwrap_err();
    assert!(matches!(err, Error::DanglingReference { ref field, .. } if field == "events"));
    assert!(load_sport(&db, s).events.is_empty());
}
