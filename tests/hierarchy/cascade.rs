//! Deactivation cascades and activation.

use std::thread;

use crate::test_utils::*;
use sportsdb::{EntityId, EntityKind, SportsDb};

struct Tree {
    sport: EntityId,
    events: Vec<EntityId>,
    selections: Vec<Vec<EntityId>>,
}

/// An active sport with `shape[i]` active selections under event `i`.
fn tree(db: &SportsDb, shape: &[usize]) -> Tree {
    let s = sport(db, "Football");
    let mut events = Vec::new();
    let mut selections = Vec::new();
    for (i, &count) in shape.iter().enumerate() {
        let e = event(db, s, &format!("Event {i}"));
        selections.push(
            (0..count)
                .map(|j| selection(db, e, &format!("Selection {i}.{j}")))
                .collect(),
        );
        events.push(e);
    }
    Tree {
        sport: s,
        events,
        selections,
    }
}

#[test]
fn test_last_selections_deactivate_events_then_sport() {
    let db = db();
    let t = tree(&db, &[1, 1]);

    db.deactivate(EntityKind::Selection, t.selections[0][0]).unwrap();
    db.deactivate(EntityKind::Selection, t.selections[1][0]).unwrap();

    assert!(!is_active(&db, EntityKind::Event, t.events[0]));
    assert!(!is_active(&db, EntityKind::Event, t.events[1]));
    assert!(!is_active(&db, EntityKind::Sport, t.sport));
}

#[test]
fn test_active_sibling_event_keeps_sport_active() {
    let db = db();
    let t = tree(&db, &[1, 1]);

    let target = db.deactivate(EntityKind::Selection, t.selections[0][0]).unwrap();
    assert_eq!(target.id(), t.selections[0][0]);
    assert!(!target.entity.is_active());

    assert!(!is_active(&db, EntityKind::Event, t.events[0]));
    assert!(is_active(&db, EntityKind::Event, t.events[1]));
    assert!(is_active(&db, EntityKind::Sport, t.sport));
}

#[test]
fn test_deactivating_event_deactivates_its_selections() {
    let db = db();
    let t = tree(&db, &[2, 1]);

    db.deactivate(EntityKind::Event, t.events[0]).unwrap();
    for &s in &t.selections[0] {
        assert!(!is_active(&db, EntityKind::Selection, s));
    }
    assert!(is_active(&db, EntityKind::Selection, t.selections[1][0]));
    assert!(is_active(&db, EntityKind::Sport, t.sport));
}

#[test]
fn test_deactivating_sport_reaches_every_selection() {
    let db = db();
    let t = tree(&db, &[2, 0, 3]);

    let sport = db.deactivate(EntityKind::Sport, t.sport).unwrap();
    assert!(!sport.entity.is_active());
    for e in &t.events {
        assert!(!is_active(&db, EntityKind::Event, *e));
    }
    for s in t.selections.iter().flatten() {
        assert!(!is_active(&db, EntityKind::Selection, *s));
    }
}

#[test]
fn test_deactivate_is_idempotent() {
    let db = db();
    let t = tree(&db, &[1, 1]);
    let first = db.deactivate(EntityKind::Selection, t.selections[0][0]).unwrap();

    // Bring the event back by hand; a repeat must not touch it again.
    db.activate(EntityKind::Event, t.events[0]).unwrap();
    let second = db.deactivate(EntityKind::Selection, t.selections[0][0]).unwrap();

    assert_eq!(first, second);
    assert!(is_active(&db, EntityKind::Event, t.events[0]));
    assert!(is_active(&db, EntityKind::Sport, t.sport));
}

#[test]
fn test_activate_does_not_cascade() {
    let db = db();
    let t = tree(&db, &[1]);
    db.deactivate(EntityKind::Sport, t.sport).unwrap();

    let selection = db.activate(EntityKind::Selection, t.selections[0][0]).unwrap();
    assert!(selection.entity.is_active());
    assert!(!is_active(&db, EntityKind::Event, t.events[0]));
    assert!(!is_active(&db, EntityKind::Sport, t.sport));
}

#[test]
fn test_deactivate_missing_entity_is_not_found() {
    let db = db();
    let err = db
        .deactivate(EntityKind::Event, EntityId::from_raw(11))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_concurrent_selection_deactivations() {
    let db = db();
    let t = tree(&db, &[4]);

    thread::scope(|scope| {
        for &s in &t.selections[0] {
            let db = db.clone();
            scope.spawn(move || db.deactivate(EntityKind::Selection, s).unwrap());
        }
    });

    assert!(!is_active(&db, EntityKind::Event, t.events[0]));
    assert!(!is_active(&db, EntityKind::Sport, t.sport));
}
