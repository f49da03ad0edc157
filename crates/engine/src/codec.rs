//! Conversion pipeline: domain values ↔ raw store values.
//!
//! Every function here has one of two shapes:
//! - [`DecodeFn`]: raw value (or `None` for a missing key) → domain value
//! - [`EncodeFn`]: domain value → raw value
//!
//! The field table in [`crate::fields`] picks the pair for each field and
//! falls back to [`decode_default`] / [`encode_default`].

use sportsdb_core::{
    timestamp_from_micros, timestamp_micros, EntityId, FieldValue, RawValue, SportsError,
    SportsResult, Timestamp,
};

/// Decodes the raw value of `field`; `None` means the key was missing.
pub type DecodeFn = fn(field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>>;

/// Encodes a domain value of `field` for the store.
pub type EncodeFn = fn(field: &str, value: &FieldValue) -> SportsResult<RawValue>;

/// Raw string reserved for the "not set yet" timestamp.
pub const ABSENT_SENTINEL: &str = "None";

const MICROS_PER_SEC: i64 = 1_000_000;

// =============================================================================
// Defaults
// =============================================================================

/// Pass a scalar through as text.
pub fn decode_default(field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
    match raw {
        None => Ok(None),
        Some(RawValue::Scalar(s)) => Ok(Some(FieldValue::Text(s))),
        Some(RawValue::List(items)) => Err(SportsError::decode(
            field,
            items.join(","),
            "expected a scalar value",
        )),
    }
}

/// Stringify.
pub fn encode_default(_field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    Ok(RawValue::Scalar(value.to_string()))
}

// =============================================================================
// Scalars
// =============================================================================

fn scalar<'a>(field: &str, raw: &'a RawValue) -> SportsResult<&'a str> {
    match raw {
        RawValue::Scalar(s) => Ok(s),
        RawValue::List(items) => Err(SportsError::decode(
            field,
            items.join(","),
            "expected a scalar value",
        )),
    }
}

fn mismatch(field: &str, expected: &str, value: &FieldValue) -> SportsError {
    SportsError::invalid_input(format!(
        "cannot encode {} value for field '{}' (expected {})",
        value.type_name(),
        field,
        expected
    ))
}

/// `"1"` → true, `"0"` → false, anything else is an error.
pub fn decode_bool(field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
    let Some(raw) = raw else { return Ok(None) };
    match scalar(field, &raw)? {
        "1" => Ok(Some(FieldValue::Bool(true))),
        "0" => Ok(Some(FieldValue::Bool(false))),
        other => Err(SportsError::decode(field, other, "expected '0' or '1'")),
    }
}

pub fn encode_bool(field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    match value {
        FieldValue::Bool(b) => Ok(RawValue::Scalar(if *b { "1" } else { "0" }.to_string())),
        other => Err(mismatch(field, "boolean", other)),
    }
}

pub fn decode_int(field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
    let Some(raw) = raw else { return Ok(None) };
    let s = scalar(field, &raw)?;
    s.parse::<i64>()
        .map(|n| Some(FieldValue::Int(n)))
        .map_err(|e| SportsError::decode(field, s, e.to_string()))
}

pub fn encode_int(field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    match value {
        FieldValue::Int(n) => Ok(RawValue::Scalar(n.to_string())),
        other => Err(mismatch(field, "integer", other)),
    }
}

pub fn decode_float(field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
    let Some(raw) = raw else { return Ok(None) };
    let s = scalar(field, &raw)?;
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Some(FieldValue::Float(x))),
        Ok(_) => Err(SportsError::decode(field, s, "not a finite number")),
        Err(e) => Err(SportsError::decode(field, s, e.to_string())),
    }
}

/// Shortest representation that parses back to the same `f64`.
pub fn encode_float(field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    match value {
        FieldValue::Float(x) if x.is_finite() => Ok(RawValue::Scalar(x.to_string())),
        FieldValue::Int(n) => Ok(RawValue::Scalar((*n as f64).to_string())),
        other => Err(mismatch(field, "finite float", other)),
    }
}

pub fn decode_id(field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
    let Some(raw) = raw else { return Ok(None) };
    let s = scalar(field, &raw)?;
    parse_id(field, s).map(|id| Some(FieldValue::Id(id)))
}

pub fn encode_id(field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    match value {
        FieldValue::Id(id) => Ok(RawValue::Scalar(id.to_string())),
        other => Err(mismatch(field, "id", other)),
    }
}

fn parse_id(field: &str, s: &str) -> SportsResult<EntityId> {
    s.parse::<EntityId>()
        .map_err(|e| SportsError::decode(field, s, e.to_string()))
}

// =============================================================================
// Timestamps
// =============================================================================

/// Format as seconds since the epoch with exactly six fractional digits.
pub fn format_timestamp(ts: Timestamp) -> String {
    let micros = timestamp_micros(ts);
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    let per_sec = MICROS_PER_SEC as u64;
    format!("{}{}.{:06}", sign, abs / per_sec, abs % per_sec)
}

/// Parse seconds since the epoch: an optional `-`, integer seconds, and up
/// to nine fractional digits. Digits past the sixth are truncated.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (secs, frac) = body.split_once('.').unwrap_or((body, ""));
    if secs.is_empty()
        || frac.len() > 9
        || !secs.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let secs: i64 = secs.parse().ok()?;
    let mut frac_micros: i64 = 0;
    for (i, b) in frac.bytes().take(6).enumerate() {
        frac_micros += i64::from(b - b'0') * 10_i64.pow(5 - i as u32);
    }
    let magnitude = secs.checked_mul(MICROS_PER_SEC)?.checked_add(frac_micros)?;
    timestamp_from_micros(if negative { -magnitude } else { magnitude })
}

pub fn decode_timestamp(field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
    let Some(raw) = raw else { return Ok(None) };
    let s = scalar(field, &raw)?;
    parse_timestamp(s)
        .map(|ts| Some(FieldValue::Timestamp(ts)))
        .ok_or_else(|| SportsError::decode(field, s, "expected seconds since the epoch"))
}

pub fn encode_timestamp(field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    match value {
        FieldValue::Timestamp(ts) => Ok(RawValue::Scalar(format_timestamp(*ts))),
        other => Err(mismatch(field, "timestamp", other)),
    }
}

/// Like [`decode_timestamp`], but the sentinel decodes to `Absent`.
pub fn decode_optional_timestamp(
    field: &str,
    raw: Option<RawValue>,
) -> SportsResult<Option<FieldValue>> {
    match &raw {
        Some(RawValue::Scalar(s)) if s == ABSENT_SENTINEL => Ok(Some(FieldValue::Absent)),
        _ => decode_timestamp(field, raw),
    }
}

pub fn encode_optional_timestamp(field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    match value {
        FieldValue::Absent => Ok(RawValue::Scalar(ABSENT_SENTINEL.to_string())),
        other => encode_timestamp(field, other),
    }
}

// =============================================================================
// Id collections
// =============================================================================

/// Decode a newest-first store list into insertion order. A missing key is
/// the empty collection.
pub fn decode_ids(field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
    let items = match raw {
        None => Vec::new(),
        Some(RawValue::List(items)) => items,
        Some(RawValue::Scalar(s)) => {
            return Err(SportsError::decode(field, s, "expected a list"));
        }
    };
    let ids = items
        .iter()
        .rev()
        .map(|s| parse_id(field, s))
        .collect::<SportsResult<Vec<_>>>()?;
    Ok(Some(FieldValue::Ids(ids)))
}

/// Encode an insertion-ordered collection into the newest-first store layout.
pub fn encode_ids(field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    match value {
        FieldValue::Ids(ids) => Ok(RawValue::List(
            ids.iter().rev().map(|id| id.to_string()).collect(),
        )),
        other => Err(mismatch(field, "id list", other)),
    }
}
