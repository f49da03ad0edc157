//! Shared fixtures.

use chrono::Utc;
use serde_json::json;
use sportsdb::{EntityId, EntityKind, EntityRecord, Event, Selection, Sport, SportsDb};

pub fn db() -> SportsDb {
    SportsDb::cache().unwrap()
}

/// A start time an hour from now, in seconds since epoch.
pub fn future_start() -> i64 {
    Utc::now().timestamp() + 3600
}

pub fn sport(db: &SportsDb, name: &str) -> EntityId {
    db.create(EntityKind::Sport, json!({"name": name, "active": true}))
        .unwrap()
        .id()
}

pub fn event(db: &SportsDb, sport: EntityId, name: &str) -> EntityId {
    db.create(
        EntityKind::Event,
        json!({
            "name": name,
            "active": true,
            "type": "PREPLAY",
            "status": "PENDING",
            "sport": sport.as_u64(),
            "scheduled_start": future_start(),
        }),
    )
    .unwrap()
    .id()
}

pub fn selection(db: &SportsDb, event: EntityId, name: &str) -> EntityId {
    db.create(
        EntityKind::Selection,
        json!({
            "name": name,
            "active": true,
            "event": event.as_u64(),
            "price": 1.5,
            "outcome": "UNSETTLED",
        }),
    )
    .unwrap()
    .id()
}

pub fn load_sport(db: &SportsDb, id: EntityId) -> Sport {
    as_sport(db.get(EntityKind::Sport, id).unwrap())
}

pub fn load_event(db: &SportsDb, id: EntityId) -> Event {
    as_event(db.get(EntityKind::Event, id).unwrap())
}

pub fn load_selection(db: &SportsDb, id: EntityId) -> Selection {
    as_selection(db.get(EntityKind::Selection, id).unwrap())
}

pub fn as_sport(record: EntityRecord) -> Sport {
    record.entity.as_sport().cloned().expect("not a sport")
}

pub fn as_event(record: EntityRecord) -> Event {
    record.entity.as_event().cloned().expect("not an event")
}

pub fn as_selection(record: EntityRecord) -> Selection {
    record.entity.as_selection().cloned().expect("not a selection")
}

pub fn is_active(db: &SportsDb, kind: EntityKind, id: EntityId) -> bool {
    db.get(kind, id).unwrap().entity.is_active()
}
