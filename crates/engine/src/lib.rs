//! Persistence engine for sportsdb
//!
//! Maps Sport, Event and Selection entities onto a field-per-key store:
//! - [`keys`]: the `{kind}:{id}:{field}` key codec
//! - [`fields`]: per-kind command resolver and conversion pipeline
//! - [`schema`] / [`validation`]: declarative field rules and the validator
//! - [`foreign_keys`]: reference resolution before writes
//! - [`EntityStore`]: create, load, update, plus the cascade rules and the
//!   filter engine
//! - [`Database`] and [`SportsDbConfig`]: the shared handle and its settings

#![warn(clippy::all)]

pub mod cascade;
pub mod codec;
pub mod config;
pub mod database;
pub mod entity;
pub mod fields;
pub mod filter;
pub mod foreign_keys;
pub mod keys;
pub mod schema;
pub mod store;
pub mod validation;

pub use cascade::RootLocks;
pub use config::SportsDbConfig;
pub use database::Database;
pub use entity::{AnyEntity, Entity, FieldMap};
pub use fields::{FieldDef, FieldTable, ReadCommand, WriteCommand};
pub use filter::{Clause, CountOp, Filter, CONJUNCTION};
pub use foreign_keys::ForeignKeyResolver;
pub use schema::{Coercion, FieldRule, FieldType, Schema};
pub use store::EntityStore;
pub use validation::{ValidationResult, Validator};
