//! Foreign-key resolution.
//!
//! A reference resolves when its target's `name` key exists. Every entity
//! writes its name last, so a half-written entity never resolves.

use sportsdb_core::{EntityId, EntityKind, SportsError, SportsResult};
use sportsdb_storage::KvStore;
use tracing::debug;

use crate::entity::FieldMap;
use crate::keys;
use crate::schema::Schema;

/// Checks the reference fields of one kind against the store.
pub struct ForeignKeyResolver<'a> {
    store: &'a dyn KvStore,
    schema: &'a Schema,
}

impl<'a> ForeignKeyResolver<'a> {
    pub fn new(store: &'a dyn KvStore, schema: &'a Schema) -> Self {
        Self { store, schema }
    }

    /// Check that every id in `ids` exists as the target of `field`.
    ///
    /// Fields that are not references resolve trivially.
    pub fn resolve(&self, field: &str, ids: &[EntityId]) -> SportsResult<()> {
        let Some(target) = self.schema.rule(field).and_then(|r| r.ty.target()) else {
            return Ok(());
        };
        for &id in ids {
            self.resolve_one(field, target, id)?;
        }
        Ok(())
    }

    /// Check every reference held by `fields`.
    pub fn resolve_all(&self, fields: &FieldMap) -> SportsResult<()> {
        for (field, value) in fields {
            self.resolve(field, &value.referenced_ids())?;
        }
        Ok(())
    }

    fn resolve_one(&self, field: &str, target: EntityKind, id: EntityId) -> SportsResult<()> {
        let key = keys::name_key(target, id);
        if self.store.get(&key)?.is_some() {
            return Ok(());
        }
        debug!(entity = %self.schema.kind(), field = %field, key = %key, "Unresolved reference");
        Err(SportsError::foreign_key(self.schema.kind(), field, target, id))
    }
}
