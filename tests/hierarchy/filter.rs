//! Filter expressions.

use crate::test_utils::*;
use sportsdb::{EntityKind, Error, SportsDb};

/// Sports "Sport 0" .. "Sport 10", where "Sport n" has n events.
fn sports_with_events(db: &SportsDb) {
    for n in 0..=10 {
        let s = sport(db, &format!("Sport {n}"));
        for i in 0..n {
            event(db, s, &format!("Event {n}.{i}"));
        }
    }
}

fn names(db: &SportsDb, kind: EntityKind, expression: &str) -> Vec<String> {
    db.filter(kind, expression)
        .unwrap()
        .into_iter()
        .map(|r| r.entity.name().to_string())
        .collect()
}

#[test]
fn test_fewer_than_five_events() {
    let db = db();
    sports_with_events(&db);
    assert_eq!(
        names(&db, EntityKind::Sport, "events:<<5"),
        ["Sport 0", "Sport 1", "Sport 2", "Sport 3", "Sport 4"]
    );
}

#[test]
fn test_regex_is_anchored_at_start() {
    let db = db();
    sports_with_events(&db);
    assert_eq!(
        names(&db, EntityKind::Sport, "regex:^Sport 1"),
        ["Sport 1", "Sport 10"]
    );
    assert_eq!(names(&db, EntityKind::Sport, "regex:1"), Vec::<String>::new());
    assert_eq!(names(&db, EntityKind::Sport, "regex:.*10"), ["Sport 10"]);
}

#[test]
fn test_count_operators() {
    let db = db();
    sports_with_events(&db);
    assert_eq!(names(&db, EntityKind::Sport, "events:==3"), ["Sport 3"]);
    assert_eq!(names(&db, EntityKind::Sport, "events:>>9"), ["Sport 10"]);
    assert_eq!(names(&db, EntityKind::Sport, "events:>=9"), ["Sport 9", "Sport 10"]);
    assert_eq!(names(&db, EntityKind::Sport, "events:<=0"), ["Sport 0"]);
}

#[test]
fn test_clauses_combine() {
    let db = db();
    sports_with_events(&db);
    assert_eq!(
        names(&db, EntityKind::Sport, "regex:Sport 1 AND events:>=1"),
        ["Sport 1", "Sport 10"]
    );
    assert_eq!(
        names(&db, EntityKind::Sport, "regex:Sport 1 AND events:<<5"),
        ["Sport 1"]
    );
}

#[test]
fn test_empty_expression_returns_everything_in_id_order() {
    let db = db();
    sports_with_events(&db);
    let all = db.filter(EntityKind::Sport, "").unwrap();
    assert_eq!(all.len(), 11);
    assert!(all.windows(2).all(|w| w[0].id() < w[1].id()));
    assert_eq!(db.filter(EntityKind::Event, "").unwrap().len(), 55);
}

#[test]
fn test_event_selection_counts() {
    let db = db();
    let s = sport(&db, "Tennis");
    let busy = event(&db, s, "Busy");
    event(&db, s, "Quiet");
    selection(&db, busy, "A");
    selection(&db, busy, "B");

    assert_eq!(names(&db, EntityKind::Event, "selections:>=2"), ["Busy"]);
    assert_eq!(names(&db, EntityKind::Event, "selections:==0"), ["Quiet"]);
}

#[test]
fn test_invalid_clauses() {
    let db = db();
    for expression in ["colour:==1", "name:==1", "events:~~1", "events:<<x", "regex:(", "events"] {
        assert!(
            matches!(db.filter(EntityKind::Sport, expression), Err(Error::InvalidFilter { .. })),
            "accepted {expression}"
        );
    }
    // Selections have no collections.
    assert!(matches!(
        db.filter(EntityKind::Selection, "events:<<1"),
        Err(Error::InvalidFilter { .. })
    ));
}
