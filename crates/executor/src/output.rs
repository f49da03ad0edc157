//! Command results.

use serde::Serialize;
use sportsdb_core::{EntityId, EntityKind};
use sportsdb_engine::AnyEntity;

/// One entity as returned to callers: its fields plus `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub kind: EntityKind,
    #[serde(flatten)]
    pub entity: AnyEntity,
}

impl EntityRecord {
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }
}

impl From<AnyEntity> for EntityRecord {
    fn from(entity: AnyEntity) -> Self {
        Self {
            kind: entity.kind(),
            entity,
        }
    }
}

/// Result of executing a [`Command`](crate::Command).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    /// A single entity (create, update, get, activate, deactivate).
    Entity(EntityRecord),
    /// Filter results, in id order.
    Entities(Vec<EntityRecord>),
}

impl Output {
    /// Render as pretty-printed JSON.
    pub fn to_json_string(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::Error::Serialization {
            reason: e.to_string(),
        })
    }
}
