//! Entity store: create, load, update and save entities field by field.
//!
//! Every field of an entity lives under its own key (see [`crate::keys`]).
//! Reads and writes go through the field table, one store command per
//! field, with no cross-field transaction:
//!
//! - `create` validates, resolves foreign keys, then writes. A failure in
//!   either check happens before the first write.
//! - `load` reads `name` first (its absence means "not found"), then every
//!   other declared field.
//! - `update` merges the supplied attributes into the loaded entity,
//!   re-validates, and rewrites only the fields that changed.
//!
//! The `name` field is always written last, so an entity interrupted
//! mid-save stays invisible to discovery and foreign-key checks.
//!
//! Cascades and filters are further `impl EntityStore` blocks in
//! [`crate::cascade`] and [`crate::filter`].

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use sportsdb_core::{
    slugify, EntityId, EntityKind, Event, EventStatus, FieldValue, RawValue, Selection,
    SportsError, SportsResult, Sport,
};
use tracing::{debug, info};

use crate::database::Database;
use crate::entity::{AnyEntity, Entity, FieldMap};
use crate::fields::{FieldTable, ReadCommand, WriteCommand};
use crate::foreign_keys::ForeignKeyResolver;
use crate::keys::{self, NAME_FIELD};
use crate::schema::FieldType;
use crate::validation::{ValidationResult, Validator};

const SLUG_FIELD: &str = "slug";

const PARENT_FIXED: &str = "read-only field, the parent is fixed at creation";

/// Typed access to the entities of a [`Database`].
#[derive(Clone)]
pub struct EntityStore {
    pub(crate) db: Arc<Database>,
}

impl EntityStore {
    /// Create a new EntityStore backed by the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// Read and decode one field. `None` if the key is missing.
    pub(crate) fn read_field(
        &self,
        kind: EntityKind,
        id: EntityId,
        field: &str,
    ) -> SportsResult<Option<FieldValue>> {
        let table = FieldTable::for_kind(kind);
        let key = keys::field_key(kind, id, field);
        let command = table.resolve_read(field);
        debug!(entity = %kind, id = %id, command = %command.template(&key), "Read field");

        let store = self.db.store();
        let raw = match command {
            ReadCommand::Get => store.get(&key)?.map(RawValue::Scalar),
            ReadCommand::LRange { start, stop } => {
                Some(RawValue::List(store.lrange(&key, start, stop)?))
            }
        };
        table.decode(field, raw)
    }

    /// Encode and write one field.
    ///
    /// List fields are append-only: only ids not yet in the stored list are
    /// pushed, and nothing is written when there are none.
    pub(crate) fn write_field(
        &self,
        kind: EntityKind,
        id: EntityId,
        field: &str,
        value: &FieldValue,
    ) -> SportsResult<()> {
        let table = FieldTable::for_kind(kind);
        let key = keys::field_key(kind, id, field);
        let command = table.resolve_write(field);
        let store = self.db.store();

        match command {
            WriteCommand::Set => match table.encode(field, value)? {
                RawValue::Scalar(raw) => {
                    debug!(entity = %kind, id = %id, command = %command.template(&key), "Write field");
                    store.set(&key, &raw)
                }
                RawValue::List(_) => Err(SportsError::invalid_input(format!(
                    "field '{}' is written with SET but encodes to a list",
                    field
                ))),
            },
            WriteCommand::LPush => {
                let Some(ids) = value.as_ids() else {
                    return Err(SportsError::invalid_input(format!(
                        "field '{}' holds an id list, got {}",
                        field,
                        value.type_name()
                    )));
                };
                let stored: FxHashSet<EntityId> = match self.read_field(kind, id, field)? {
                    Some(FieldValue::Ids(stored)) => stored.into_iter().collect(),
                    _ => FxHashSet::default(),
                };
                let delta: Vec<EntityId> =
                    ids.iter().filter(|id| !stored.contains(*id)).copied().collect();
                if delta.is_empty() {
                    return Ok(());
                }

                let RawValue::List(newest_first) = table.encode(field, &FieldValue::Ids(delta))?
                else {
                    return Err(SportsError::invalid_input(format!(
                        "field '{}' is written with LPUSH but encodes to a scalar",
                        field
                    )));
                };
                // LPUSH puts each value at the head in turn: push oldest first.
                let values: Vec<String> = newest_first.into_iter().rev().collect();
                debug!(
                    entity = %kind,
                    id = %id,
                    command = %command.template(&key),
                    count = values.len(),
                    "Write field"
                );
                store.lpush(&key, &values).map(|_| ())
            }
        }
    }

    /// Write `fields`, `name` last.
    fn write_fields(&self, kind: EntityKind, id: EntityId, fields: &FieldMap) -> SportsResult<()> {
        for (field, value) in fields.iter().filter(|(f, _)| **f != NAME_FIELD) {
            self.write_field(kind, id, field, value)?;
        }
        if let Some(name) = fields.get(NAME_FIELD) {
            self.write_field(kind, id, NAME_FIELD, name)?;
        }
        Ok(())
    }

    /// Read a single field of an entity.
    pub fn get_field(
        &self,
        kind: EntityKind,
        id: EntityId,
        field: &str,
    ) -> SportsResult<Option<FieldValue>> {
        keys::validate_field_name(field)?;
        self.read_field(kind, id, field)
    }

    /// Write a single field of an entity, resolving it first if it is a
    /// reference. Parent links are refused, and collections only take
    /// children of this entity; the value is not validated beyond that.
    pub fn put_field(
        &self,
        kind: EntityKind,
        id: EntityId,
        field: &str,
        value: &FieldValue,
    ) -> SportsResult<()> {
        keys::validate_field_name(field)?;
        let schema = self.db.schema(kind);
        if schema.parent_field() == Some(field) {
            let mut result = ValidationResult::ok();
            result.push(field, PARENT_FIXED);
            return result.into_result(kind);
        }
        ForeignKeyResolver::new(self.db.store(), schema).resolve(field, &value.referenced_ids())?;
        if let FieldValue::Ids(ids) = value {
            self.check_children(kind, id, field, ids)?.into_result(kind)?;
        }
        self.write_field(kind, id, field, value)
    }

    /// Children added to collection `field` of `parent` must already
    /// reference `parent`; a child is only ever listed under its own parent.
    fn check_children(
        &self,
        kind: EntityKind,
        parent: EntityId,
        field: &str,
        added: &[EntityId],
    ) -> SportsResult<ValidationResult> {
        let mut result = ValidationResult::ok();
        let Some(FieldType::References(child_kind)) = self.db.schema(kind).rule(field).map(|r| r.ty)
        else {
            return Ok(result);
        };
        let Some(owner_field) = self.db.schema(child_kind).parent_field() else {
            return Ok(result);
        };
        for child in added {
            match self.read_field(child_kind, *child, owner_field)? {
                Some(FieldValue::Id(owner)) if owner == parent => {}
                _ => result.push(
                    field,
                    format!("{} {} belongs to another {}", child_kind, child, kind),
                ),
            }
        }
        Ok(result)
    }

    /// Does an entity with this id exist?
    pub fn exists(&self, kind: EntityKind, id: EntityId) -> SportsResult<bool> {
        Ok(self.db.store().get(&keys::name_key(kind, id))?.is_some())
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Write every present field of `entity`.
    pub fn save<E: Entity>(&self, entity: &E) -> SportsResult<()> {
        self.write_fields(E::KIND, entity.id(), &entity.present_fields())
    }

    /// Validate `attrs`, generate an id and persist the new entity.
    ///
    /// The new entity is then appended to its parent's collection.
    pub fn create<E: Entity>(&self, attrs: &Map<String, Value>) -> SportsResult<E> {
        let kind = E::KIND;
        let schema = self.db.schema(kind);
        let supplied: BTreeSet<String> = attrs.keys().cloned().collect();

        let mut fields = Validator::new(schema, self.db.now()).validate(attrs, &supplied)?;
        if schema.rule(SLUG_FIELD).is_some() {
            let slug = fields.get(NAME_FIELD).and_then(FieldValue::as_text).map(slugify);
            if let Some(slug) = slug {
                fields.insert(SLUG_FIELD, FieldValue::Text(slug));
            }
        }
        ForeignKeyResolver::new(self.db.store(), schema).resolve_all(&fields)?;

        let id = EntityId::generate();
        let entity = E::from_fields(id, &fields)?;
        self.save(&entity)?;
        info!(entity = %kind, id = %id, name = %entity.name(), "Created entity");

        if let Some((parent_kind, parent_id)) = entity.parent() {
            self.link_child(parent_kind, parent_id, kind, id)?;
        }
        Ok(entity)
    }

    /// Append `child` to the matching collection of its parent.
    fn link_child(
        &self,
        parent_kind: EntityKind,
        parent_id: EntityId,
        child_kind: EntityKind,
        child_id: EntityId,
    ) -> SportsResult<()> {
        let Some(field) = self.db.schema(parent_kind).collection_of(child_kind) else {
            return Ok(());
        };
        let mut partial = Map::new();
        partial.insert(field.to_string(), Value::from(vec![child_id.as_u64()]));
        self.update_any_unlocked(parent_kind, parent_id, &partial)?;
        debug!(parent = %parent_kind, parent_id = %parent_id, child = %child_id, "Linked child");
        Ok(())
    }

    /// Load an entity by id.
    ///
    /// Fails with `MissingResult` naming `name` if the entity does not
    /// exist, or naming the first required field that has no key.
    pub fn load<E: Entity>(&self, id: EntityId) -> SportsResult<E> {
        let kind = E::KIND;
        let table = FieldTable::for_kind(kind);
        let schema = self.db.schema(kind);

        let name = self
            .read_field(kind, id, NAME_FIELD)?
            .ok_or_else(|| SportsError::missing(kind, id, NAME_FIELD))?;
        let mut fields = FieldMap::new();
        fields.insert(NAME_FIELD, name);

        for def in table.fields().iter().filter(|d| d.name != NAME_FIELD) {
            match self.read_field(kind, id, def.name)? {
                Some(value) => {
                    fields.insert(def.name, value);
                }
                None if schema.rule(def.name).is_some_and(|r| r.stored_required()) => {
                    return Err(SportsError::missing(kind, id, def.name));
                }
                None => {}
            }
        }
        E::from_fields(id, &fields)
    }

    /// Merge `partial` into the stored entity and write what changed.
    ///
    /// Supplying `active` takes the sport's cascade lock, so activation
    /// changes never interleave with a cascade on the same hierarchy.
    pub fn update<E: Entity>(&self, id: EntityId, partial: &Map<String, Value>) -> SportsResult<E> {
        if partial.contains_key("active") {
            self.with_root_lock(E::KIND, id, || self.update_unlocked(id, partial))
        } else {
            self.update_unlocked(id, partial)
        }
    }

    pub(crate) fn update_unlocked<E: Entity>(
        &self,
        id: EntityId,
        partial: &Map<String, Value>,
    ) -> SportsResult<E> {
        let kind = E::KIND;
        let schema = self.db.schema(kind);
        let current: E = self.load(id)?;
        let current_fields = current.present_fields();

        let mut merged = current.to_json_map();
        for (key, value) in partial {
            merged.insert(key.clone(), value.clone());
        }
        let supplied: BTreeSet<String> = partial.keys().cloned().collect();
        let now = self.db.now();
        let mut fields = Validator::new(schema, now).validate(&merged, &supplied)?;

        // Collections only grow: supplied ids are appended to the stored ones.
        for field in schema.collections() {
            if !supplied.contains(field) {
                continue;
            }
            if let Some(FieldValue::Ids(added)) = fields.get(field) {
                let mut ids = current.collection(field).map(<[EntityId]>::to_vec).unwrap_or_default();
                for id in added {
                    if !ids.contains(id) {
                        ids.push(*id);
                    }
                }
                fields.insert(field, FieldValue::Ids(ids));
            }
        }

        // Defaults only apply to fields the caller asked for.
        fields.retain(|field, _| supplied.contains(*field) || current_fields.contains_key(field));

        if kind == EntityKind::Event && marks_started(&fields, &current_fields, &supplied) {
            fields.insert("actual_start", FieldValue::Timestamp(now));
        }

        let changed: FieldMap = fields
            .iter()
            .filter(|(field, value)| current_fields.get(*field) != Some(*value))
            .map(|(field, value)| (*field, value.clone()))
            .collect();
        if changed.is_empty() {
            debug!(entity = %kind, id = %id, "Update changed nothing");
            return Ok(current);
        }

        let parent_field = schema.parent_field();
        let mut hierarchy = ValidationResult::ok();
        let resolver = ForeignKeyResolver::new(self.db.store(), schema);
        for (field, value) in &changed {
            if Some(*field) == parent_field {
                hierarchy.push(field, PARENT_FIXED);
                continue;
            }
            let ids: Vec<EntityId> = match (value, current.collection(field)) {
                (FieldValue::Ids(ids), Some(stored)) => {
                    ids.iter().filter(|id| !stored.contains(*id)).copied().collect()
                }
                _ => value.referenced_ids(),
            };
            resolver.resolve(field, &ids)?;
            if matches!(value, FieldValue::Ids(_)) {
                hierarchy.merge(self.check_children(kind, id, field, &ids)?);
            }
        }
        hierarchy.into_result(kind)?;

        let updated = E::from_fields(id, &fields)?;
        self.write_fields(kind, id, &changed)?;
        debug!(
            entity = %kind,
            id = %id,
            fields = ?changed.keys().collect::<Vec<_>>(),
            "Updated entity"
        );
        Ok(updated)
    }

    // =========================================================================
    // Dynamic dispatch over kinds
    // =========================================================================

    pub fn create_any(&self, kind: EntityKind, attrs: &Map<String, Value>) -> SportsResult<AnyEntity> {
        match kind {
            EntityKind::Sport => self.create::<Sport>(attrs).map(AnyEntity::from),
            EntityKind::Event => self.create::<Event>(attrs).map(AnyEntity::from),
            EntityKind::Selection => self.create::<Selection>(attrs).map(AnyEntity::from),
        }
    }

    pub fn load_any(&self, kind: EntityKind, id: EntityId) -> SportsResult<AnyEntity> {
        match kind {
            EntityKind::Sport => self.load::<Sport>(id).map(AnyEntity::from),
            EntityKind::Event => self.load::<Event>(id).map(AnyEntity::from),
            EntityKind::Selection => self.load::<Selection>(id).map(AnyEntity::from),
        }
    }

    pub fn update_any(
        &self,
        kind: EntityKind,
        id: EntityId,
        partial: &Map<String, Value>,
    ) -> SportsResult<AnyEntity> {
        match kind {
            EntityKind::Sport => self.update::<Sport>(id, partial).map(AnyEntity::from),
            EntityKind::Event => self.update::<Event>(id, partial).map(AnyEntity::from),
            EntityKind::Selection => self.update::<Selection>(id, partial).map(AnyEntity::from),
        }
    }

    pub(crate) fn update_any_unlocked(
        &self,
        kind: EntityKind,
        id: EntityId,
        partial: &Map<String, Value>,
    ) -> SportsResult<AnyEntity> {
        match kind {
            EntityKind::Sport => self.update_unlocked::<Sport>(id, partial).map(AnyEntity::from),
            EntityKind::Event => self.update_unlocked::<Event>(id, partial).map(AnyEntity::from),
            EntityKind::Selection => {
                self.update_unlocked::<Selection>(id, partial).map(AnyEntity::from)
            }
        }
    }
}

/// An update moving a not-started event to STARTED records its start time,
/// unless the caller set `actual_start` itself.
fn marks_started(fields: &FieldMap, current: &FieldMap, supplied: &BTreeSet<String>) -> bool {
    supplied.contains("status")
        && !supplied.contains("actual_start")
        && fields.get("status") == Some(&FieldValue::Int(EventStatus::Started.value()))
        && current.get("actual_start") == Some(&FieldValue::Absent)
}
