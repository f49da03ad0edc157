//! Command execution layer for sportsdb
//!
//! Turns `(operation, kind, arguments)` requests into engine calls:
//! - [`Command`]: the parsed request
//! - [`Executor`]: dispatches commands to handlers
//! - [`Output`]: serializable results
//! - [`Error`]: caller-facing error kinds

#![warn(clippy::all)]

pub mod bridge;
pub mod command;
pub mod convert;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod output;

pub use command::Command;
pub use error::Error;
pub use executor::Executor;
pub use output::{EntityRecord, Output};

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, Error>;
