//! Mapping between domain structs and field maps.
//!
//! The [`Entity`] trait is how the store sees a Sport, Event or Selection:
//! a kind, an id, and a list of named fields that are each present or
//! absent. [`AnyEntity`] carries one of the three when the kind is only
//! known at runtime.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use sportsdb_core::{
    EntityId, EntityKind, Event, EventStatus, EventType, FieldValue, Outcome, Selection,
    SportsError, SportsResult, Sport, StartTime, Timestamp,
};

/// Typed field values keyed by field name.
pub type FieldMap = BTreeMap<&'static str, FieldValue>;

/// A persistable entity.
pub trait Entity: Sized + Clone + Serialize {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    fn name(&self) -> &str;

    fn is_active(&self) -> bool;

    /// Every declared field except the id, in declaration order.
    /// `None` marks a field that is absent and must not be written.
    fn to_fields(&self) -> Vec<(&'static str, Option<FieldValue>)>;

    /// Rebuild an entity from validated or loaded field values.
    fn from_fields(id: EntityId, fields: &FieldMap) -> SportsResult<Self>;

    /// The parent this entity belongs to, if any.
    fn parent(&self) -> Option<(EntityKind, EntityId)> {
        None
    }

    /// Ids held by a collection field; `None` if there is no such collection.
    fn collection(&self, _field: &str) -> Option<&[EntityId]> {
        None
    }

    fn into_any(self) -> AnyEntity;

    /// Present fields only.
    fn present_fields(&self) -> FieldMap {
        self.to_fields()
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }

    /// Present fields as a JSON attribute map, in the form validation accepts.
    fn to_json_map(&self) -> Map<String, Value> {
        self.to_fields()
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v.to_json())))
            .collect()
    }
}

// =============================================================================
// Field accessors
// =============================================================================

fn missing(field: &str) -> SportsError {
    SportsError::decode(field, "", "required value missing")
}

fn wrong(field: &str, expected: &str, value: &FieldValue) -> SportsError {
    SportsError::decode(
        field,
        value.to_string(),
        format!("expected {}, found {}", expected, value.type_name()),
    )
}

fn text(fields: &FieldMap, field: &str) -> SportsResult<String> {
    match fields.get(field) {
        Some(FieldValue::Text(s)) => Ok(s.clone()),
        Some(other) => Err(wrong(field, "string", other)),
        None => Err(missing(field)),
    }
}

fn flag(fields: &FieldMap, field: &str) -> SportsResult<bool> {
    match fields.get(field) {
        Some(FieldValue::Bool(b)) => Ok(*b),
        Some(other) => Err(wrong(field, "boolean", other)),
        None => Ok(false),
    }
}

fn int(fields: &FieldMap, field: &str) -> SportsResult<i64> {
    match fields.get(field) {
        Some(FieldValue::Int(n)) => Ok(*n),
        Some(other) => Err(wrong(field, "integer", other)),
        None => Err(missing(field)),
    }
}

fn member<T>(fields: &FieldMap, field: &str, from_value: fn(i64) -> Option<T>) -> SportsResult<T> {
    let n = int(fields, field)?;
    from_value(n).ok_or_else(|| SportsError::decode(field, n.to_string(), "unknown member value"))
}

fn float(fields: &FieldMap, field: &str) -> SportsResult<f64> {
    match fields.get(field) {
        Some(FieldValue::Float(x)) => Ok(*x),
        Some(FieldValue::Int(n)) => Ok(*n as f64),
        Some(other) => Err(wrong(field, "float", other)),
        None => Err(missing(field)),
    }
}

fn timestamp(fields: &FieldMap, field: &str) -> SportsResult<Timestamp> {
    match fields.get(field) {
        Some(FieldValue::Timestamp(ts)) => Ok(*ts),
        Some(other) => Err(wrong(field, "timestamp", other)),
        None => Err(missing(field)),
    }
}

fn start_time(fields: &FieldMap, field: &str) -> SportsResult<Option<StartTime>> {
    match fields.get(field) {
        Some(FieldValue::Timestamp(ts)) => Ok(Some(StartTime::At(*ts))),
        Some(FieldValue::Absent) => Ok(Some(StartTime::NotStarted)),
        Some(other) => Err(wrong(field, "timestamp", other)),
        None => Ok(None),
    }
}

fn reference(fields: &FieldMap, field: &str) -> SportsResult<EntityId> {
    match fields.get(field) {
        Some(FieldValue::Id(id)) => Ok(*id),
        Some(other) => Err(wrong(field, "id", other)),
        None => Err(missing(field)),
    }
}

fn references(fields: &FieldMap, field: &str) -> SportsResult<Vec<EntityId>> {
    match fields.get(field) {
        Some(FieldValue::Ids(ids)) => Ok(ids.clone()),
        Some(other) => Err(wrong(field, "id list", other)),
        None => Ok(Vec::new()),
    }
}

fn start_value(start: &StartTime) -> FieldValue {
    match start {
        StartTime::NotStarted => FieldValue::Absent,
        StartTime::At(ts) => FieldValue::Timestamp(*ts),
    }
}

// =============================================================================
// Implementations
// =============================================================================

impl Entity for Sport {
    const KIND: EntityKind = EntityKind::Sport;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn to_fields(&self) -> Vec<(&'static str, Option<FieldValue>)> {
        vec![
            ("name", Some(FieldValue::Text(self.name.clone()))),
            ("active", Some(FieldValue::Bool(self.active))),
            ("slug", Some(FieldValue::Text(self.slug.clone()))),
            ("events", Some(FieldValue::Ids(self.events.clone()))),
        ]
    }

    fn from_fields(id: EntityId, fields: &FieldMap) -> SportsResult<Self> {
        Ok(Sport {
            id,
            name: text(fields, "name")?,
            slug: text(fields, "slug")?,
            active: flag(fields, "active")?,
            events: references(fields, "events")?,
        })
    }

    fn collection(&self, field: &str) -> Option<&[EntityId]> {
        match field {
            "events" => Some(&self.events),
            _ => None,
        }
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Sport(self)
    }
}

impl Entity for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn to_fields(&self) -> Vec<(&'static str, Option<FieldValue>)> {
        vec![
            ("name", Some(FieldValue::Text(self.name.clone()))),
            ("active", Some(FieldValue::Bool(self.active))),
            ("slug", Some(FieldValue::Text(self.slug.clone()))),
            ("type", Some(FieldValue::Int(self.event_type.value()))),
            ("status", Some(FieldValue::Int(self.status.value()))),
            ("sport", Some(FieldValue::Id(self.sport))),
            (
                "scheduled_start",
                Some(FieldValue::Timestamp(self.scheduled_start)),
            ),
            ("actual_start", self.actual_start.as_ref().map(start_value)),
            ("selections", Some(FieldValue::Ids(self.selections.clone()))),
        ]
    }

    fn from_fields(id: EntityId, fields: &FieldMap) -> SportsResult<Self> {
        Ok(Event {
            id,
            name: text(fields, "name")?,
            slug: text(fields, "slug")?,
            event_type: member(fields, "type", EventType::from_value)?,
            status: member(fields, "status", EventStatus::from_value)?,
            sport: reference(fields, "sport")?,
            scheduled_start: timestamp(fields, "scheduled_start")?,
            actual_start: start_time(fields, "actual_start")?,
            selections: references(fields, "selections")?,
            active: flag(fields, "active")?,
        })
    }

    fn parent(&self) -> Option<(EntityKind, EntityId)> {
        Some((EntityKind::Sport, self.sport))
    }

    fn collection(&self, field: &str) -> Option<&[EntityId]> {
        match field {
            "selections" => Some(&self.selections),
            _ => None,
        }
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Event(self)
    }
}

impl Entity for Selection {
    const KIND: EntityKind = EntityKind::Selection;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn to_fields(&self) -> Vec<(&'static str, Option<FieldValue>)> {
        vec![
            ("name", Some(FieldValue::Text(self.name.clone()))),
            ("active", Some(FieldValue::Bool(self.active))),
            ("event", Some(FieldValue::Id(self.event))),
            ("price", Some(FieldValue::Float(self.price))),
            ("outcome", Some(FieldValue::Int(self.outcome.value()))),
        ]
    }

    fn from_fields(id: EntityId, fields: &FieldMap) -> SportsResult<Self> {
        Ok(Selection {
            id,
            name: text(fields, "name")?,
            event: reference(fields, "event")?,
            price: float(fields, "price")?,
            outcome: member(fields, "outcome", Outcome::from_value)?,
            active: flag(fields, "active")?,
        })
    }

    fn parent(&self) -> Option<(EntityKind, EntityId)> {
        Some((EntityKind::Event, self.event))
    }

    fn into_any(self) -> AnyEntity {
        AnyEntity::Selection(self)
    }
}

// =============================================================================
// AnyEntity
// =============================================================================

/// An entity of a kind chosen at runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyEntity {
    Sport(Sport),
    Event(Event),
    Selection(Selection),
}

impl AnyEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            AnyEntity::Sport(_) => EntityKind::Sport,
            AnyEntity::Event(_) => EntityKind::Event,
            AnyEntity::Selection(_) => EntityKind::Selection,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            AnyEntity::Sport(e) => e.id,
            AnyEntity::Event(e) => e.id,
            AnyEntity::Selection(e) => e.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AnyEntity::Sport(e) => &e.name,
            AnyEntity::Event(e) => &e.name,
            AnyEntity::Selection(e) => &e.name,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            AnyEntity::Sport(e) => e.active,
            AnyEntity::Event(e) => e.active,
            AnyEntity::Selection(e) => e.active,
        }
    }

    pub fn as_sport(&self) -> Option<&Sport> {
        match self {
            AnyEntity::Sport(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            AnyEntity::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_selection(&self) -> Option<&Selection> {
        match self {
            AnyEntity::Selection(e) => Some(e),
            _ => None,
        }
    }

    /// JSON object of the entity, with `id` and `kind`.
    pub fn to_json(&self) -> SportsResult<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert("kind".to_string(), Value::String(self.kind().to_string()));
        }
        Ok(value)
    }
}

impl From<Sport> for AnyEntity {
    fn from(e: Sport) -> Self {
        AnyEntity::Sport(e)
    }
}

impl From<Event> for AnyEntity {
    fn from(e: Event) -> Self {
        AnyEntity::Event(e)
    }
}

impl From<Selection> for AnyEntity {
    fn from(e: Selection) -> Self {
        AnyEntity::Selection(e)
    }
}
