//! Error types shared by the core, storage and engine crates.
//!
//! Every failure the persistence layer can report is a [`SportsError`].
//! The four domain kinds (validation, foreign key, missing result, filter)
//! are distinct variants so callers can branch on them; the remaining
//! variants describe store-level problems.

use std::fmt;

use thiserror::Error;

use crate::id::EntityId;
use crate::kind::EntityKind;

/// Result type alias for sportsdb operations.
pub type SportsResult<T> = Result<T, SportsError>;

/// One violated field reported by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl FieldViolation {
    /// Create a violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum SportsError {
    /// The entity failed its declared field constraints.
    ///
    /// Carries every violated field, never only the first.
    #[error("validation failed for {entity}: {}", join_violations(.violations))]
    Validation {
        /// Entity kind being validated.
        entity: EntityKind,
        /// All violations found.
        violations: Vec<FieldViolation>,
    },

    /// A reference field points to an entity that does not exist.
    #[error("unresolved foreign key {entity}.{field} -> {target}:{id}")]
    ForeignKey {
        /// Kind holding the reference.
        entity: EntityKind,
        /// Reference field name.
        field: String,
        /// Kind the reference points at.
        target: EntityKind,
        /// The id that could not be resolved.
        id: EntityId,
    },

    /// A required read returned no value.
    #[error("{entity}:{id} not found (missing field '{field}')")]
    MissingResult {
        /// Entity kind being read.
        entity: EntityKind,
        /// Entity id being read.
        id: EntityId,
        /// Field whose key was absent.
        field: String,
    },

    /// A filter expression could not be evaluated.
    #[error("invalid filter clause '{clause}': {reason}")]
    Filter {
        /// The offending clause or verb.
        clause: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A store key holds a value of the wrong type for the command.
    #[error("wrong type for key '{key}': expected {expected}, found {actual}")]
    WrongType {
        /// Store key.
        key: String,
        /// Expected store type.
        expected: String,
        /// Actual store type.
        actual: String,
    },

    /// A raw store value could not be decoded into a domain value.
    #[error("cannot decode '{raw}' for field '{field}': {reason}")]
    Decode {
        /// Field being decoded.
        field: String,
        /// The raw value.
        raw: String,
        /// Why decoding failed.
        reason: String,
    },

    /// Caller input was malformed before reaching validation.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the problem.
        message: String,
    },

    /// The underlying store failed.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the failure.
        message: String,
        /// Underlying I/O error, if any.
        #[source]
        source: Option<std::io::Error>,
    },

    /// Serialization of a snapshot or record failed.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl SportsError {
    /// Create a validation error from a set of violations.
    pub fn validation(entity: EntityKind, violations: Vec<FieldViolation>) -> Self {
        SportsError::Validation { entity, violations }
    }

    /// Create a foreign-key error.
    pub fn foreign_key(
        entity: EntityKind,
        field: impl Into<String>,
        target: EntityKind,
        id: EntityId,
    ) -> Self {
        SportsError::ForeignKey {
            entity,
            field: field.into(),
            target,
            id,
        }
    }

    /// Create a missing-result error.
    pub fn missing(entity: EntityKind, id: EntityId, field: impl Into<String>) -> Self {
        SportsError::MissingResult {
            entity,
            id,
            field: field.into(),
        }
    }

    /// Create a filter error.
    pub fn filter(clause: impl Into<String>, reason: impl Into<String>) -> Self {
        SportsError::Filter {
            clause: clause.into(),
            reason: reason.into(),
        }
    }

    /// Create a wrong-type error.
    pub fn wrong_type(
        key: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        SportsError::WrongType {
            key: key.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(
        field: impl Into<String>,
        raw: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SportsError::Decode {
            field: field.into(),
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SportsError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a storage error without an underlying source.
    pub fn storage(message: impl Into<String>) -> Self {
        SportsError::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error wrapping an I/O error.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        SportsError::Storage {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        SportsError::Serialization {
            message: message.into(),
        }
    }

    /// True if this error means "the entity does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, SportsError::MissingResult { .. })
    }

    /// The violations carried by a validation error, empty otherwise.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            SportsError::Validation { violations, .. } => violations,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for SportsError {
    fn from(err: serde_json::Error) -> Self {
        SportsError::serialization(err.to_string())
    }
}
