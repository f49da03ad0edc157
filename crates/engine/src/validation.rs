//! Validation of attribute maps against a [`Schema`].
//!
//! Validation turns a JSON attribute map into typed [`FieldMap`] values and
//! reports every violated rule at once. Normalization happens here too:
//! enum names become their integers, timestamps are truncated to
//! microseconds, prices are rounded. A map that validates is therefore
//! already in the exact form that gets persisted.
//!
//! Accepted input forms per base type:
//!
//! | type | accepted |
//! |---|---|
//! | text | string |
//! | bool | `true`/`false`, `0`/`1` |
//! | integer, reference | integer, decimal string |
//! | enum | member value (integer or decimal string), member name |
//! | float | number, numeric string |
//! | timestamp | seconds since the epoch (number or string), RFC 3339 string |
//! | optional timestamp | as timestamp, plus `null` and `"None"` for "not set yet" |
//! | references | array of references |

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sportsdb_core::{
    timestamp_from_micros, truncate_to_micros, EntityId, EntityKind, FieldValue, FieldViolation,
    SportsError, SportsResult, Timestamp,
};

use crate::codec::{parse_timestamp, ABSENT_SENTINEL};
use crate::entity::FieldMap;
use crate::schema::{FieldRule, FieldType, Schema};

/// Attributes that are never accepted from callers.
const READ_ONLY_ATTRIBUTES: &[&str] = &["id"];

/// Result of validating one attribute map
///
/// Accumulates all violations found during validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// All violations detected during validation
    pub violations: Vec<FieldViolation>,
}

impl ValidationResult {
    /// Create a successful validation result (no violations)
    pub fn ok() -> Self {
        Self::default()
    }

    /// Check if validation passed (no violations)
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Record a violation
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, message));
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.violations.extend(other.violations);
    }

    /// Convert into an error carrying every violation, if there are any
    pub fn into_result(self, kind: EntityKind) -> SportsResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SportsError::validation(kind, self.violations))
        }
    }
}

/// Validates attribute maps of one kind at one point in time.
pub struct Validator<'a> {
    schema: &'a Schema,
    now: Timestamp,
}

impl<'a> Validator<'a> {
    /// `now` is the reference point of time-relative bounds.
    pub fn new(schema: &'a Schema, now: Timestamp) -> Self {
        Self { schema, now }
    }

    /// Validate and normalize `attrs`.
    ///
    /// `supplied` names the attributes the caller provided in this request.
    /// Derived and read-only fields are rejected only when supplied, and the
    /// time bound only applies to supplied values, so a loaded entity merged
    /// with a partial update validates without re-checking stored values.
    pub fn validate(
        &self,
        attrs: &Map<String, Value>,
        supplied: &BTreeSet<String>,
    ) -> SportsResult<FieldMap> {
        let mut result = ValidationResult::ok();
        let mut fields = FieldMap::new();

        for key in attrs.keys() {
            if READ_ONLY_ATTRIBUTES.contains(&key.as_str()) {
                result.push(key, "read-only field, ids are generated");
            } else if self.schema.rule(key).is_none() {
                result.push(key, "unknown field");
            }
        }

        for rule in self.schema.rules() {
            let is_supplied = supplied.contains(rule.name);
            if rule.derived && is_supplied {
                result.push(rule.name, "read-only field, derived from other fields");
                continue;
            }

            let value = match attrs.get(rule.name) {
                Some(Value::Null) if rule.ty != FieldType::OptionalTimestamp => None,
                other => other,
            };

            match value {
                Some(value) => match self.check(rule, value, is_supplied) {
                    Ok(v) => {
                        fields.insert(rule.name, v);
                    }
                    Err(message) => result.push(rule.name, message),
                },
                None if rule.required => result.push(rule.name, "required field"),
                None => {
                    if let Some(default) = &rule.default {
                        fields.insert(rule.name, default.clone());
                    }
                }
            }
        }

        result.into_result(self.schema.kind())?;
        Ok(fields)
    }

    fn check(&self, rule: &FieldRule, value: &Value, is_supplied: bool) -> Result<FieldValue, String> {
        let mut typed = coerce_type(rule.ty, value)?;

        if let (Some(coercion), FieldValue::Float(x)) = (&rule.coerce, &typed) {
            typed = FieldValue::Float(coercion.apply(*x));
        }

        if rule.non_empty {
            if let FieldValue::Text(s) = &typed {
                if s.is_empty() {
                    return Err("empty values not allowed".into());
                }
            }
        }

        if let Some(x) = typed.as_float() {
            if let Some(min) = rule.min {
                if x < min {
                    return Err(format!("min value is {}", min));
                }
            }
            if let Some(max) = rule.max {
                if x > max {
                    return Err(format!("max value is {}", max));
                }
            }
        }

        if rule.not_before_now && is_supplied {
            if let FieldValue::Timestamp(ts) = &typed {
                if *ts < self.now {
                    return Err(format!(
                        "must not be before {}",
                        self.now.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
                    ));
                }
            }
        }

        Ok(typed)
    }
}

// =============================================================================
// Type coercion
// =============================================================================

fn coerce_type(ty: FieldType, value: &Value) -> Result<FieldValue, String> {
    match ty {
        FieldType::Text => match value {
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            _ => Err("must be of string type".into()),
        },
        FieldType::Bool => match value {
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Number(n) if n.as_i64() == Some(0) => Ok(FieldValue::Bool(false)),
            Value::Number(n) if n.as_i64() == Some(1) => Ok(FieldValue::Bool(true)),
            _ => Err("must be of boolean type".into()),
        },
        FieldType::Integer => coerce_int(value)
            .map(FieldValue::Int)
            .ok_or_else(|| "must be of integer type".into()),
        FieldType::Enum(members) => coerce_member(members, value).map(FieldValue::Int),
        FieldType::Float => match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|x| x.is_finite())
        .map(FieldValue::Float)
        .ok_or_else(|| "must be of float type".into()),
        FieldType::Timestamp => coerce_timestamp(value).map(FieldValue::Timestamp),
        FieldType::OptionalTimestamp => match value {
            Value::Null => Ok(FieldValue::Absent),
            Value::String(s) if s == ABSENT_SENTINEL => Ok(FieldValue::Absent),
            other => coerce_timestamp(other).map(FieldValue::Timestamp),
        },
        FieldType::Reference(_) => coerce_id(value)
            .map(FieldValue::Id)
            .ok_or_else(|| "must be an entity id".into()),
        FieldType::References(_) => {
            let Value::Array(items) = value else {
                return Err("must be of list type".into());
            };
            let mut ids = Vec::with_capacity(items.len());
            for item in items {
                let id = coerce_id(item)
                    .ok_or_else(|| format!("list items must be entity ids, found {}", item))?;
                if ids.contains(&id) {
                    return Err(format!("duplicate id {}", id));
                }
                ids.push(id);
            }
            Ok(FieldValue::Ids(ids))
        }
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_u64().map(EntityId::from_raw),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn coerce_member(members: &[(&str, i64)], value: &Value) -> Result<i64, String> {
    let by_name = match value {
        Value::String(s) => members
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(_, v)| *v),
        _ => None,
    };
    let n = match by_name.or_else(|| coerce_int(value)) {
        Some(n) => n,
        None => return Err(format!("unallowed value {}", value)),
    };
    if members.iter().any(|(_, v)| *v == n) {
        Ok(n)
    } else {
        Err(format!("unallowed value {}", n))
    }
}

fn coerce_timestamp(value: &Value) -> Result<Timestamp, String> {
    let parsed = match value {
        Value::Number(n) => match n.as_i64() {
            Some(secs) => secs.checked_mul(1_000_000).and_then(timestamp_from_micros),
            None => n
                .as_f64()
                .filter(|x| x.is_finite() && x.abs() < 1e12)
                .and_then(|x| timestamp_from_micros((x * 1e6).round() as i64)),
        },
        Value::String(s) => parse_timestamp(s.trim()).or_else(|| {
            DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }),
        _ => None,
    };
    parsed
        .map(truncate_to_micros)
        .ok_or_else(|| "must be a timestamp (epoch seconds or RFC 3339)".into())
}
