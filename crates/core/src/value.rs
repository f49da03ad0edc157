//! Domain and store value representations.
//!
//! - [`FieldValue`]: a typed domain value held by one entity field
//! - [`RawValue`]: what the key-value store holds for one key (a string or
//!   a list of strings)

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Timelike, Utc};

use crate::id::EntityId;

/// Timestamps are UTC instants with microsecond precision.
pub type Timestamp = DateTime<Utc>;

/// Drop sub-microsecond precision from a timestamp.
///
/// Stored timestamps carry six fractional digits, so every domain timestamp
/// is normalized to that precision before it is persisted.
pub fn truncate_to_micros(ts: Timestamp) -> Timestamp {
    let nanos = ts.nanosecond();
    let truncated = nanos - nanos % 1_000;
    ts.with_nanosecond(truncated).unwrap_or(ts)
}

/// Microseconds since the Unix epoch.
pub fn timestamp_micros(ts: Timestamp) -> i64 {
    ts.timestamp() * 1_000_000 + i64::from(ts.timestamp_subsec_micros())
}

/// Build a timestamp from microseconds since the Unix epoch.
///
/// Returns `None` if the instant is outside the representable range.
pub fn timestamp_from_micros(micros: i64) -> Option<Timestamp> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    Utc.timestamp_opt(secs, nanos).single()
}

/// A typed value held by one entity field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free text (names, slugs).
    Text(String),
    /// Activation flags.
    Bool(bool),
    /// Integers and enum discriminants.
    Int(i64),
    /// Prices.
    Float(f64),
    /// A point in time.
    Timestamp(Timestamp),
    /// The explicit "not set yet" timestamp sentinel.
    Absent,
    /// A single reference.
    Id(EntityId),
    /// An ordered id collection.
    Ids(Vec<EntityId>),
}

impl FieldValue {
    /// Short type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "string",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Int(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Absent => "absent",
            FieldValue::Id(_) => "id",
            FieldValue::Ids(_) => "id list",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(x) => Some(*x),
            FieldValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<EntityId> {
        match self {
            FieldValue::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[EntityId]> {
        match self {
            FieldValue::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    /// Every id referenced by this value (one for `Id`, all for `Ids`).
    pub fn referenced_ids(&self) -> Vec<EntityId> {
        match self {
            FieldValue::Id(id) => vec![*id],
            FieldValue::Ids(ids) => ids.clone(),
            _ => Vec::new(),
        }
    }

    /// JSON form used when a loaded entity is re-validated.
    ///
    /// Timestamps use RFC 3339 with microseconds so the conversion is exact.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(n) => Value::from(*n),
            FieldValue::Float(x) => serde_json::Number::from_f64(*x)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Timestamp(ts) => {
                Value::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            FieldValue::Absent => Value::Null,
            FieldValue::Id(id) => Value::from(id.as_u64()),
            FieldValue::Ids(ids) => Value::Array(ids.iter().map(|id| Value::from(id.as_u64())).collect()),
        }
    }
}

/// Stringification used by the default encoder.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Timestamp(ts) => {
                f.write_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            FieldValue::Absent => f.write_str("None"),
            FieldValue::Id(id) => write!(f, "{}", id),
            FieldValue::Ids(ids) => {
                let parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

/// The value stored under a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// A string value (GET/SET).
    Scalar(String),
    /// A list value (LPUSH/LRANGE), in store order.
    List(Vec<String>),
}

impl RawValue {
    /// Store type name, as reported in wrong-type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Scalar(_) => "string",
            RawValue::List(_) => "list",
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Scalar(s) => f.write_str(s),
            RawValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}
