//! Entity command handlers: create, update, get.

use std::sync::Arc;

use serde_json::{Map, Value};
use sportsdb_core::{EntityId, EntityKind};

use crate::bridge::Primitives;
use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle Create command.
pub fn create(p: &Arc<Primitives>, kind: EntityKind, attrs: &Map<String, Value>) -> Result<Output> {
    let entity = convert_result(p.store.create_any(kind, attrs))?;
    Ok(Output::Entity(entity.into()))
}

/// Handle Update command.
pub fn update(
    p: &Arc<Primitives>,
    kind: EntityKind,
    id: EntityId,
    attrs: &Map<String, Value>,
) -> Result<Output> {
    let entity = convert_result(p.store.update_any(kind, id, attrs))?;
    Ok(Output::Entity(entity.into()))
}

/// Handle Get command.
pub fn get(p: &Arc<Primitives>, kind: EntityKind, id: EntityId) -> Result<Output> {
    let entity = convert_result(p.store.load_any(kind, id))?;
    Ok(Output::Entity(entity.into()))
}
