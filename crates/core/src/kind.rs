//! Entity kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SportsError;

/// The three entity types of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Top of the hierarchy.
    Sport,
    /// Belongs to a sport.
    Event,
    /// Belongs to an event.
    Selection,
}

impl EntityKind {
    /// All kinds, parent first.
    pub const ALL: [EntityKind; 3] = [EntityKind::Sport, EntityKind::Event, EntityKind::Selection];

    /// Lowercase name used in store keys and requests.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Sport => "sport",
            EntityKind::Event => "event",
            EntityKind::Selection => "selection",
        }
    }

    /// The kind one level up, if any.
    pub const fn parent(&self) -> Option<EntityKind> {
        match self {
            EntityKind::Sport => None,
            EntityKind::Event => Some(EntityKind::Sport),
            EntityKind::Selection => Some(EntityKind::Event),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = SportsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sport" => Ok(EntityKind::Sport),
            "event" => Ok(EntityKind::Event),
            "selection" => Ok(EntityKind::Selection),
            other => Err(SportsError::invalid_input(format!(
                "unknown entity type '{}' (expected sport, event or selection)",
                other
            ))),
        }
    }
}
