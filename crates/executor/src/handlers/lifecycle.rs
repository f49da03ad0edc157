//! Activation handlers.

use std::sync::Arc;

use sportsdb_core::{EntityId, EntityKind};

use crate::bridge::Primitives;
use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle Deactivate command. Returns the target after the cascade.
pub fn deactivate(p: &Arc<Primitives>, kind: EntityKind, id: EntityId) -> Result<Output> {
    let entity = convert_result(p.store.deactivate(kind, id))?;
    Ok(Output::Entity(entity.into()))
}

/// Handle Activate command.
pub fn activate(p: &Arc<Primitives>, kind: EntityKind, id: EntityId) -> Result<Output> {
    let entity = convert_result(p.store.activate(kind, id))?;
    Ok(Output::Entity(entity.into()))
}
