//! Caller-facing errors.
//!
//! Every failure of a [`Command`](crate::Command) is one of these kinds, so
//! a caller can tell "not found" from "invalid input" from "dangling
//! reference" without parsing messages.

use serde::Serialize;
use thiserror::Error;

/// Errors returned by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum Error {
    /// The entity does not exist, or a required field of it is missing.
    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },

    /// Attributes failed validation; `violations` lists every field.
    #[error("invalid {kind}: {}", .violations.join("; "))]
    Validation { kind: String, violations: Vec<String> },

    /// Malformed request.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A reference field points at an entity that does not exist.
    #[error("{kind}.{field} references missing {target} {id}")]
    DanglingReference {
        kind: String,
        field: String,
        target: String,
        id: String,
    },

    /// The filter expression could not be evaluated.
    #[error("invalid filter '{clause}': {reason}")]
    InvalidFilter { clause: String, reason: String },

    /// A store key holds the wrong type of value.
    #[error("wrong type: expected {expected}, found {actual}")]
    WrongType { expected: String, actual: String },

    /// The store could not be read or written.
    #[error("I/O error: {reason}")]
    Io { reason: String },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
