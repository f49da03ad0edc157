//! Attribute validation and coercion.

use crate::test_utils::*;
use serde_json::json;
use sportsdb::{EntityKind, Error, EventType, Outcome};

fn violations(err: Error) -> Vec<String> {
    match err {
        Error::Validation { violations, .. } => violations,
        other => panic!("Expected Validation, got {other:?}"),
    }
}

fn selection_with_price(db: &sportsdb::SportsDb, price: serde_json::Value) -> sportsdb::Result<f64> {
    let e = event(db, sport(db, "Darts"), "Match");
    db.create(
        EntityKind::Selection,
        json!({"name": "A", "event": e.as_u64(), "price": price, "outcome": 0}),
    )
    .map(|r| as_selection(r).price)
}

#[test]
fn test_negative_price_rejected() {
    let db = db();
    let err = selection_with_price(&db, json!(-0.01)).unwrap_err();
    assert_eq!(violations(err), ["price: min value is 0"]);
}

#[test]
fn test_price_rounding_both_directions() {
    let db = db();
    // 1.005 is 1.00499999... in binary, so it rounds down.
    assert_eq!(selection_with_price(&db, json!(1.005)).unwrap(), 1.0);
    assert_eq!(selection_with_price(&db, json!(1.006)).unwrap(), 1.01);
    assert_eq!(selection_with_price(&db, json!(0.125)).unwrap(), 0.13);
    assert_eq!(selection_with_price(&db, json!(2.344)).unwrap(), 2.34);
}

#[test]
fn test_every_violation_is_reported() {
    let db = db();
    let err = db
        .create(
            EntityKind::Event,
            json!({"name": "", "type": "FRIENDLY", "colour": "red"}),
        )
        .unwrap_err();
    let violations = violations(err);
    for field in ["colour", "name", "type", "status", "sport", "scheduled_start"] {
        assert!(
            violations.iter().any(|v| v.starts_with(&format!("{field}:"))),
            "no violation for {field} in {violations:?}"
        );
    }
}

#[test]
fn test_generated_fields_cannot_be_supplied() {
    let db = db();
    let with_id = db
        .create(EntityKind::Sport, json!({"name": "Polo", "id": 5}))
        .unwrap_err();
    assert!(violations(with_id)[0].starts_with("id:"));

    let with_slug = db
        .create(EntityKind::Sport, json!({"name": "Polo", "slug": "polo"}))
        .unwrap_err();
    assert!(violations(with_slug)[0].starts_with("slug:"));
}

#[test]
fn test_enum_names_and_values() {
    let db = db();
    let s = sport(&db, "Rugby");
    let by_name = as_event(
        db.create(
            EntityKind::Event,
            json!({"name": "A", "type": "inplay", "status": "PENDING", "sport": s.as_u64(), "scheduled_start": future_start()}),
        )
        .unwrap(),
    );
    let by_value = as_event(
        db.create(
            EntityKind::Event,
            json!({"name": "B", "type": 1, "status": "0", "sport": s.as_u64(), "scheduled_start": future_start()}),
        )
        .unwrap(),
    );
    assert_eq!(by_name.event_type, EventType::Inplay);
    assert_eq!(by_value.event_type, EventType::Inplay);
    assert_eq!(by_name.status, by_value.status);

    let e = by_name.id;
    let err = db
        .create(
            EntityKind::Selection,
            json!({"name": "X", "event": e.as_u64(), "price": 1, "outcome": 9}),
        )
        .unwrap_err();
    assert_eq!(violations(err), ["outcome: unallowed value 9"]);

    let settled = as_selection(
        db.create(
            EntityKind::Selection,
            json!({"name": "Y", "event": e.as_u64(), "price": 1, "outcome": "VOID"}),
        )
        .unwrap(),
    );
    assert_eq!(settled.outcome, Outcome::Void);
}

#[test]
fn test_scheduled_start_in_the_past() {
    let db = db();
    let s = sport(&db, "Squash");
    let err = db
        .create(
            EntityKind::Event,
            json!({"name": "Old", "type": 0, "status": 0, "sport": s.as_u64(), "scheduled_start": 1_000_000}),
        )
        .unwrap_err();
    assert!(violations(err)[0].starts_with("scheduled_start:"));

    let e = event(&db, s, "New");
    let err = db
        .update(EntityKind::Event, e, json!({"scheduled_start": "2001-01-01T00:00:00Z"}))
        .unwrap_err();
    assert!(violations(err)[0].starts_with("scheduled_start:"));
}

#[test]
fn test_boolean_coercion() {
    let db = db();
    let on = db.create(EntityKind::Sport, json!({"name": "On", "active": 1})).unwrap();
    assert!(on.entity.is_active());
    let off = db.create(EntityKind::Sport, json!({"name": "Off"})).unwrap();
    assert!(!off.entity.is_active());
    assert!(db
        .create(EntityKind::Sport, json!({"name": "Maybe", "active": 2}))
        .is_err());
}

#[test]
fn test_non_object_attributes() {
    let db = db();
    assert!(matches!(
        db.create(EntityKind::Sport, json!(["name"])),
        Err(Error::InvalidInput { .. })
    ));
}
