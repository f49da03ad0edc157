//! Cascade rules for the activation flag.
//!
//! Deactivation propagates upward one level at a time:
//! - a selection: deactivate it; if every selection of its event is now
//!   inactive, deactivate the event as below
//! - an event: deactivate its selections and itself; if every event of its
//!   sport is now inactive, deactivate the sport
//! - a sport: deactivate each of its events (with their selections), then
//!   the sport
//!
//! Activation never cascades. Deactivating an inactive entity is a no-op
//! and does not re-run the parent check.
//!
//! Every cascade step is a separate load or write. With
//! `cascade_locking` enabled, each operation holds the lock of the sport at
//! the root of its hierarchy, so concurrent cascades and activation changes
//! on one sport never interleave.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use sportsdb_core::{
    EntityId, EntityKind, Event, FieldValue, Selection, SportsError, SportsResult, Sport,
};
use tracing::{debug, info};

use crate::entity::{AnyEntity, Entity};
use crate::keys::NAME_FIELD;
use crate::store::EntityStore;

const ACTIVE_FIELD: &str = "active";

/// One mutex per hierarchy root, created on first use.
#[derive(Default)]
pub struct RootLocks {
    locks: DashMap<EntityId, Arc<Mutex<()>>>,
}

impl RootLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding the hierarchy under `root`.
    pub fn for_root(&self, root: EntityId) -> Arc<Mutex<()>> {
        self.locks.entry(root).or_default().clone()
    }

    /// Number of roots locked so far.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl fmt::Debug for RootLocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootLocks").field("roots", &self.len()).finish()
    }
}

impl EntityStore {
    // =========================================================================
    // Locking
    // =========================================================================

    /// Run `f` holding the lock of the sport above `(kind, id)`, if cascade
    /// locking is enabled.
    pub(crate) fn with_root_lock<T>(
        &self,
        kind: EntityKind,
        id: EntityId,
        f: impl FnOnce() -> SportsResult<T>,
    ) -> SportsResult<T> {
        let Some(locks) = self.db.root_locks() else {
            return f();
        };
        let root = self.root_of(kind, id)?;
        let lock = locks.for_root(root);
        let _guard = lock.lock();
        f()
    }

    /// The sport at the root of the hierarchy containing `(kind, id)`.
    pub fn root_of(&self, kind: EntityKind, id: EntityId) -> SportsResult<EntityId> {
        match kind {
            EntityKind::Sport => Ok(id),
            EntityKind::Event => self.reference_of(kind, id, "sport"),
            EntityKind::Selection => {
                let event = self.reference_of(kind, id, "event")?;
                self.reference_of(EntityKind::Event, event, "sport")
            }
        }
    }

    fn reference_of(&self, kind: EntityKind, id: EntityId, field: &str) -> SportsResult<EntityId> {
        match self.read_field(kind, id, field)? {
            Some(FieldValue::Id(parent)) => Ok(parent),
            Some(other) => Err(SportsError::decode(
                field,
                other.to_string(),
                "expected an entity id",
            )),
            None if self.exists(kind, id)? => Err(SportsError::missing(kind, id, field)),
            None => Err(SportsError::missing(kind, id, NAME_FIELD)),
        }
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    /// Deactivate a selection, then its event if no sibling is still active.
    pub fn deactivate_selection(&self, id: EntityId) -> SportsResult<Selection> {
        self.with_root_lock(EntityKind::Selection, id, || {
            self.deactivate_selection_unlocked(id)?;
            self.load(id)
        })
    }

    /// Deactivate an event and its selections, then its sport if no sibling
    /// event is still active.
    pub fn deactivate_event(&self, id: EntityId) -> SportsResult<Event> {
        self.with_root_lock(EntityKind::Event, id, || {
            self.deactivate_event_unlocked(id, true)?;
            self.load(id)
        })
    }

    /// Deactivate a sport with every event and selection under it.
    pub fn deactivate_sport(&self, id: EntityId) -> SportsResult<Sport> {
        self.with_root_lock(EntityKind::Sport, id, || {
            self.deactivate_sport_unlocked(id)?;
            self.load(id)
        })
    }

    /// Deactivate any entity. Returns the target, reloaded after the cascade.
    pub fn deactivate(&self, kind: EntityKind, id: EntityId) -> SportsResult<AnyEntity> {
        match kind {
            EntityKind::Sport => self.deactivate_sport(id).map(AnyEntity::from),
            EntityKind::Event => self.deactivate_event(id).map(AnyEntity::from),
            EntityKind::Selection => self.deactivate_selection(id).map(AnyEntity::from),
        }
    }

    /// Activate a single entity. Parents and children are left alone.
    pub fn activate(&self, kind: EntityKind, id: EntityId) -> SportsResult<AnyEntity> {
        self.update_any(kind, id, &active_attr(true))
    }

    // =========================================================================
    // Cascade steps (caller holds the root lock)
    // =========================================================================

    fn deactivate_selection_unlocked(&self, id: EntityId) -> SportsResult<()> {
        let selection: Selection = self.load(id)?;
        if !selection.active {
            debug!(entity = %EntityKind::Selection, id = %id, "Already inactive");
            return Ok(());
        }
        self.set_active::<Selection>(id, false)?;
        info!(entity = %EntityKind::Selection, id = %id, "Deactivated");

        let event: Event = self.load(selection.event)?;
        if event.active && self.all_inactive(EntityKind::Selection, &event.selections)? {
            info!(
                entity = %EntityKind::Event,
                id = %event.id,
                "Every selection inactive, cascading"
            );
            self.deactivate_event_unlocked(event.id, true)?;
        }
        Ok(())
    }

    fn deactivate_event_unlocked(&self, id: EntityId, cascade_up: bool) -> SportsResult<()> {
        let event: Event = self.load(id)?;
        if !event.active {
            debug!(entity = %EntityKind::Event, id = %id, "Already inactive");
            return Ok(());
        }
        for &selection in &event.selections {
            if self.is_active(EntityKind::Selection, selection)? {
                self.set_active::<Selection>(selection, false)?;
            }
        }
        self.set_active::<Event>(id, false)?;
        info!(
            entity = %EntityKind::Event,
            id = %id,
            selections = event.selections.len(),
            "Deactivated"
        );

        if !cascade_up {
            return Ok(());
        }
        let sport: Sport = self.load(event.sport)?;
        if sport.active && self.all_inactive(EntityKind::Event, &sport.events)? {
            self.set_active::<Sport>(sport.id, false)?;
            info!(
                entity = %EntityKind::Sport,
                id = %sport.id,
                "Every event inactive, deactivated"
            );
        }
        Ok(())
    }

    fn deactivate_sport_unlocked(&self, id: EntityId) -> SportsResult<()> {
        let sport: Sport = self.load(id)?;
        if !sport.active {
            debug!(entity = %EntityKind::Sport, id = %id, "Already inactive");
            return Ok(());
        }
        for &event in &sport.events {
            self.deactivate_event_unlocked(event, false)?;
        }
        self.set_active::<Sport>(id, false)?;
        info!(entity = %EntityKind::Sport, id = %id, events = sport.events.len(), "Deactivated");
        Ok(())
    }

    fn set_active<E: Entity>(&self, id: EntityId, active: bool) -> SportsResult<()> {
        self.update_unlocked::<E>(id, &active_attr(active)).map(|_| ())
    }

    fn is_active(&self, kind: EntityKind, id: EntityId) -> SportsResult<bool> {
        Ok(matches!(
            self.read_field(kind, id, ACTIVE_FIELD)?,
            Some(FieldValue::Bool(true))
        ))
    }

    fn all_inactive(&self, kind: EntityKind, ids: &[EntityId]) -> SportsResult<bool> {
        for &id in ids {
            if self.is_active(kind, id)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn active_attr(active: bool) -> Map<String, Value> {
    let mut attrs = Map::new();
    attrs.insert(ACTIVE_FIELD.to_string(), Value::Bool(active));
    attrs
}
