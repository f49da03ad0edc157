//! Error conversion from internal error types.
//!
//! Maps [`SportsError`] onto the executor's [`Error`] kinds.

use crate::Error;
use sportsdb_core::SportsError;

/// Convert a SportsError to an executor Error.
impl From<SportsError> for Error {
    fn from(err: SportsError) -> Self {
        match err {
            SportsError::Validation { entity, violations } => Error::Validation {
                kind: entity.to_string(),
                violations: violations.iter().map(|v| v.to_string()).collect(),
            },

            SportsError::ForeignKey {
                entity,
                field,
                target,
                id,
            } => Error::DanglingReference {
                kind: entity.to_string(),
                field,
                target: target.to_string(),
                id: id.to_string(),
            },

            // A missing required field makes the entity unreadable: not found.
            SportsError::MissingResult { entity, id, .. } => Error::NotFound {
                kind: entity.to_string(),
                id: id.to_string(),
            },

            SportsError::Filter { clause, reason } => Error::InvalidFilter { clause, reason },

            SportsError::WrongType {
                key,
                expected,
                actual,
            } => Error::WrongType {
                expected: format!("{} at '{}'", expected, key),
                actual,
            },

            SportsError::Decode { field, raw, reason } => Error::Internal {
                reason: format!("stored value '{}' of field '{}' is unreadable: {}", raw, field, reason),
            },

            SportsError::InvalidInput { message } => Error::InvalidInput { reason: message },

            SportsError::Storage { message, source } => {
                let reason = if let Some(ref src) = source {
                    format!("{}: {}", message, src)
                } else {
                    message
                };
                Error::Io { reason }
            }

            SportsError::Serialization { message } => Error::Serialization { reason: message },
        }
    }
}

/// Convert a sportsdb_core::SportsResult to an executor Result.
pub fn convert_result<T>(result: sportsdb_core::SportsResult<T>) -> crate::Result<T> {
    result.map_err(Error::from)
}
