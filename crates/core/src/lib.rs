//! Core types for sportsdb
//!
//! This crate defines the vocabulary shared by every other crate:
//! - [`EntityId`]: time-ordered unique ids
//! - [`EntityKind`]: Sport, Event, Selection
//! - The domain model ([`Sport`], [`Event`], [`Selection`] and their enums)
//! - [`FieldValue`] / [`RawValue`]: typed field values and raw store values
//! - [`slugify`]: slug derivation
//! - [`SportsError`]: the error type of the persistence layer

#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod kind;
pub mod model;
pub mod slug;
pub mod value;

pub use error::{FieldViolation, SportsError, SportsResult};
pub use id::EntityId;
pub use kind::EntityKind;
pub use model::{Event, EventStatus, EventType, Outcome, Selection, Sport, StartTime};
pub use slug::slugify;
pub use value::{
    timestamp_from_micros, timestamp_micros, truncate_to_micros, FieldValue, RawValue, Timestamp,
};
