//! Filter handler.

use std::sync::Arc;

use sportsdb_core::EntityKind;

use crate::bridge::Primitives;
use crate::convert::convert_result;
use crate::{Output, Result};

/// Handle Filter command.
pub fn filter(p: &Arc<Primitives>, kind: EntityKind, expression: &str) -> Result<Output> {
    let entities = convert_result(p.store.filter_any(kind, expression))?;
    Ok(Output::Entities(entities.into_iter().map(Into::into).collect()))
}
