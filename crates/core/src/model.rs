//! Domain entities: Sport → Event → Selection.

use serde::{Serialize, Serializer};

use crate::id::EntityId;
use crate::value::Timestamp;

/// Declares an integer-backed enumeration with named members.
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:literal => $label:tt),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant = $value),+
        }

        impl $name {
            /// Every member as `(name, value)`.
            pub const MEMBERS: &'static [(&'static str, i64)] = &[$(($label, $value)),+];

            /// The underlying integer.
            pub const fn value(self) -> i64 {
                self as i64
            }

            /// Look a member up by its integer value.
            pub fn from_value(value: i64) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

int_enum! {
    /// Whether an event is traded before or during play.
    EventType { Preplay = 0 => "PREPLAY", Inplay = 1 => "INPLAY" }
}

int_enum! {
    /// Progress of an event.
    EventStatus {
        Pending = 0 => "PENDING",
        Started = 1 => "STARTED",
        Ending = 2 => "ENDING",
        Cancelled = 3 => "CANCELLED",
    }
}

int_enum! {
    /// Settlement result of a selection.
    Outcome {
        Unsettled = 0 => "UNSETTLED",
        Void = 1 => "VOID",
        Lose = 2 => "LOSE",
        Win = 3 => "WIN",
    }
}

/// When an event actually started.
///
/// `NotStarted` is stored as an explicit sentinel, distinct from a missing
/// key (which on an [`Event`] shows up as `actual_start: None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartTime {
    /// The event has not been marked started.
    #[default]
    NotStarted,
    /// The event started at this instant.
    At(Timestamp),
}

impl StartTime {
    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            StartTime::NotStarted => None,
            StartTime::At(ts) => Some(*ts),
        }
    }
}

impl Serialize for StartTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StartTime::NotStarted => serializer.serialize_str("not_started"),
            StartTime::At(ts) => ts.serialize(serializer),
        }
    }
}

/// A sport, the root of a hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sport {
    pub id: EntityId,
    pub name: String,
    /// Derived from `name` at creation, never recomputed.
    pub slug: String,
    pub active: bool,
    /// Event ids in insertion order.
    pub events: Vec<EntityId>,
}

/// An event under a sport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: EntityId,
    pub name: String,
    /// Derived from `name` at creation, never recomputed.
    pub slug: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub status: EventStatus,
    pub sport: EntityId,
    pub scheduled_start: Timestamp,
    /// `None` when the stored key is missing, i.e. the start time is unknown.
    pub actual_start: Option<StartTime>,
    /// Selection ids in insertion order.
    pub selections: Vec<EntityId>,
    pub active: bool,
}

/// A selection (a priced outcome) under an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub id: EntityId,
    pub name: String,
    pub event: EntityId,
    /// Non-negative, already rounded.
    pub price: f64,
    pub outcome: Outcome,
    pub active: bool,
}
