//! Create, get and update.

use crate::test_utils::*;
use serde_json::json;
use sportsdb::{EntityKind, EventStatus, StartTime};

#[test]
fn test_create_then_get() {
    let db = db();
    let created = db
        .create(EntityKind::Sport, json!({"name": "Ice Hockey", "active": true}))
        .unwrap();
    let fetched = db.get(EntityKind::Sport, created.id()).unwrap();
    assert_eq!(created, fetched);

    let sport = as_sport(fetched);
    assert_eq!(sport.name, "Ice Hockey");
    assert_eq!(sport.slug, "ice-hockey");
    assert!(sport.active);
    assert!(sport.events.is_empty());
}

#[test]
fn test_ids_follow_creation_order() {
    let db = db();
    let ids: Vec<_> = (0..20).map(|i| sport(&db, &format!("Sport {i}"))).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_same_name_same_slug() {
    let db = db();
    let a = load_sport(&db, sport(&db, "Formula 1"));
    let b = load_sport(&db, sport(&db, "Formula 1"));
    assert_ne!(a.id, b.id);
    assert_eq!(a.slug, b.slug);
    assert_eq!(a.slug, "formula-1");
}

#[test]
fn test_rename_keeps_slug() {
    let db = db();
    let id = sport(&db, "Soccer");
    let renamed = as_sport(
        db.update(EntityKind::Sport, id, json!({"name": "Association Football"}))
            .unwrap(),
    );
    assert_eq!(renamed.name, "Association Football");
    assert_eq!(renamed.slug, "soccer");
    assert_eq!(load_sport(&db, id).slug, "soccer");
}

#[test]
fn test_children_are_linked_to_parents() {
    let db = db();
    let s = sport(&db, "Cricket");
    let e1 = event(&db, s, "Test Match");
    let e2 = event(&db, s, "T20");
    let sel = selection(&db, e1, "England");

    assert_eq!(load_sport(&db, s).events, vec![e1, e2]);
    assert_eq!(load_event(&db, e1).selections, vec![sel]);
    assert!(load_event(&db, e2).selections.is_empty());
}

#[test]
fn test_update_merges_partial_attributes() {
    let db = db();
    let e = event(&db, sport(&db, "Tennis"), "Final");
    let sel = selection(&db, e, "Player A");

    let updated = as_selection(
        db.update(EntityKind::Selection, sel, json!({"price": 3.333, "outcome": "WIN"}))
            .unwrap(),
    );
    assert_eq!(updated.price, 3.33);
    assert_eq!(updated.name, "Player A");
    assert_eq!(updated.event, e);
    assert_eq!(load_selection(&db, sel), updated);
}

#[test]
fn test_starting_an_event_records_actual_start() {
    let db = db();
    let e = event(&db, sport(&db, "Golf"), "The Open");
    assert_eq!(load_event(&db, e).actual_start, Some(StartTime::NotStarted));

    let started = as_event(
        db.update(EntityKind::Event, e, json!({"status": "STARTED"}))
            .unwrap(),
    );
    assert_eq!(started.status, EventStatus::Started);
    assert!(matches!(started.actual_start, Some(StartTime::At(_))));
    assert_eq!(load_event(&db, e), started);
}

#[test]
fn test_past_start_does_not_block_later_updates() {
    let db = db();
    let e = event(&db, sport(&db, "Boxing"), "Title Fight");
    // Name-only updates never re-check the stored start time.
    let renamed = as_event(
        db.update(EntityKind::Event, e, json!({"name": "Title Fight II"}))
            .unwrap(),
    );
    assert_eq!(renamed.name, "Title Fight II");
}

#[test]
fn test_get_unknown_id_is_not_found() {
    let db = db();
    let err = db
        .get(EntityKind::Selection, sportsdb::EntityId::from_raw(99))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_update_unknown_id_is_not_found() {
    let db = db();
    let err = db
        .update(
            EntityKind::Sport,
            sportsdb::EntityId::from_raw(99),
            json!({"name": "Ghost"}),
        )
        .unwrap_err();
    assert!(err.is_not_found());
}
