//! Field table: per-kind store commands and converters.
//!
//! Each entity kind has a [`FieldTable`] built once on first use. A
//! [`FieldDef`] may override the read command, the write command, the
//! decoder and the encoder; anything it leaves unset, and any field the
//! table does not know, falls back to:
//!
//! | concern | default |
//! |---|---|
//! | read | `GET key` |
//! | write | `SET key value` |
//! | decode | [`codec::decode_default`] (pass-through) |
//! | encode | [`codec::encode_default`] (stringify) |

use std::fmt;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use sportsdb_core::{EntityKind, FieldValue, RawValue, SportsResult};

use crate::codec::{self, DecodeFn, EncodeFn};

/// How a field is read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCommand {
    /// `GET key`
    Get,
    /// `LRANGE key start stop`
    LRange { start: i64, stop: i64 },
}

impl ReadCommand {
    /// Render the command for `key`, as it would be sent to the store.
    pub fn template(&self, key: &str) -> String {
        match self {
            ReadCommand::Get => format!("GET {}", key),
            ReadCommand::LRange { start, stop } => format!("LRANGE {} {} {}", key, start, stop),
        }
    }
}

/// How a field is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCommand {
    /// `SET key value`
    Set,
    /// `LPUSH key value...`
    LPush,
}

impl WriteCommand {
    /// Render the command for `key`, without its values.
    pub fn template(&self, key: &str) -> String {
        match self {
            WriteCommand::Set => format!("SET {}", key),
            WriteCommand::LPush => format!("LPUSH {}", key),
        }
    }
}

impl fmt::Display for ReadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadCommand::Get => f.write_str("GET"),
            ReadCommand::LRange { .. } => f.write_str("LRANGE"),
        }
    }
}

impl fmt::Display for WriteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteCommand::Set => f.write_str("SET"),
            WriteCommand::LPush => f.write_str("LPUSH"),
        }
    }
}

/// Store mapping of one field. Unset members use the table defaults.
#[derive(Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub read: Option<ReadCommand>,
    pub write: Option<WriteCommand>,
    pub decode: Option<DecodeFn>,
    pub encode: Option<EncodeFn>,
}

impl FieldDef {
    /// A field using every default.
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            read: None,
            write: None,
            decode: None,
            encode: None,
        }
    }

    /// Override the converters.
    pub const fn codec(mut self, decode: DecodeFn, encode: EncodeFn) -> Self {
        self.decode = Some(decode);
        self.encode = Some(encode);
        self
    }

    /// Override the store commands.
    pub const fn commands(mut self, read: ReadCommand, write: WriteCommand) -> Self {
        self.read = Some(read);
        self.write = Some(write);
        self
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::plain(name).codec(codec::decode_bool, codec::encode_bool)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::plain(name).codec(codec::decode_int, codec::encode_int)
    }

    pub const fn float(name: &'static str) -> Self {
        Self::plain(name).codec(codec::decode_float, codec::encode_float)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::plain(name).codec(codec::decode_timestamp, codec::encode_timestamp)
    }

    pub const fn optional_timestamp(name: &'static str) -> Self {
        Self::plain(name).codec(
            codec::decode_optional_timestamp,
            codec::encode_optional_timestamp,
        )
    }

    pub const fn reference(name: &'static str) -> Self {
        Self::plain(name).codec(codec::decode_id, codec::encode_id)
    }

    /// An id collection kept in a store list, read whole.
    pub const fn id_list(name: &'static str) -> Self {
        Self::plain(name)
            .commands(ReadCommand::LRange { start: 0, stop: -1 }, WriteCommand::LPush)
            .codec(codec::decode_ids, codec::encode_ids)
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("read", &self.read)
            .field("write", &self.write)
            .field("custom_decode", &self.decode.is_some())
            .field("custom_encode", &self.encode.is_some())
            .finish()
    }
}

/// The fields of one entity kind, in declaration order.
#[derive(Debug)]
pub struct FieldTable {
    kind: EntityKind,
    fields: Vec<FieldDef>,
    index: FxHashMap<&'static str, usize>,
}

impl FieldTable {
    /// Start an empty table for `kind`.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Add a field, replacing any earlier definition with the same name.
    pub fn with(mut self, def: FieldDef) -> Self {
        match self.index.get(def.name) {
            Some(&i) => self.fields[i] = def,
            None => {
                self.index.insert(def.name, self.fields.len());
                self.fields.push(def);
            }
        }
        self
    }

    /// Add several fields in order.
    pub fn with_all(self, defs: impl IntoIterator<Item = FieldDef>) -> Self {
        defs.into_iter().fold(self, FieldTable::with)
    }

    /// The table of a kind.
    pub fn for_kind(kind: EntityKind) -> &'static FieldTable {
        match kind {
            EntityKind::Sport => &SPORT_FIELDS,
            EntityKind::Event => &EVENT_FIELDS,
            EntityKind::Selection => &SELECTION_FIELDS,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&FieldDef> {
        self.index.get(field).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.index.contains_key(field)
    }

    pub fn resolve_read(&self, field: &str) -> ReadCommand {
        self.get(field)
            .and_then(|def| def.read)
            .unwrap_or(ReadCommand::Get)
    }

    pub fn resolve_write(&self, field: &str) -> WriteCommand {
        self.get(field)
            .and_then(|def| def.write)
            .unwrap_or(WriteCommand::Set)
    }

    pub fn decode(&self, field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
        let decode = self
            .get(field)
            .and_then(|def| def.decode)
            .unwrap_or(codec::decode_default);
        decode(field, raw)
    }

    pub fn encode(&self, field: &str, value: &FieldValue) -> SportsResult<RawValue> {
        let encode = self
            .get(field)
            .and_then(|def| def.encode)
            .unwrap_or(codec::encode_default);
        encode(field, value)
    }
}

// =============================================================================
// Per-kind tables
// =============================================================================

/// Fields every entity has.
fn model_fields() -> [FieldDef; 2] {
    [FieldDef::plain("name"), FieldDef::boolean("active")]
}

/// Fields of entities that carry a slug.
fn named_fields() -> [FieldDef; 1] {
    [FieldDef::plain("slug")]
}

static SPORT_FIELDS: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(EntityKind::Sport)
        .with_all(model_fields())
        .with_all(named_fields())
        .with(FieldDef::id_list("events"))
});

static EVENT_FIELDS: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(EntityKind::Event)
        .with_all(model_fields())
        .with_all(named_fields())
        .with(FieldDef::integer("type"))
        .with(FieldDef::integer("status"))
        .with(FieldDef::reference("sport"))
        .with(FieldDef::timestamp("scheduled_start"))
        .with(FieldDef::optional_timestamp("actual_start"))
        .with(FieldDef::id_list("selections"))
});

static SELECTION_FIELDS: Lazy<FieldTable> = Lazy::new(|| {
    FieldTable::new(EntityKind::Selection)
        .with_all(model_fields())
        .with(FieldDef::reference("event"))
        .with(FieldDef::float("price"))
        .with(FieldDef::integer("outcome"))
});

// =============================================================================
// Resolver entry points
// =============================================================================

/// Read command for a field, `GET` unless overridden.
pub fn resolve_read(kind: EntityKind, field: &str) -> ReadCommand {
    FieldTable::for_kind(kind).resolve_read(field)
}

/// Write command for a field, `SET` unless overridden.
pub fn resolve_write(kind: EntityKind, field: &str) -> WriteCommand {
    FieldTable::for_kind(kind).resolve_write(field)
}

/// Decode a raw store value of a field.
pub fn decode(kind: EntityKind, field: &str, raw: Option<RawValue>) -> SportsResult<Option<FieldValue>> {
    FieldTable::for_kind(kind).decode(field, raw)
}

/// Encode a domain value of a field.
pub fn encode(kind: EntityKind, field: &str, value: &FieldValue) -> SportsResult<RawValue> {
    FieldTable::for_kind(kind).encode(field, value)
}
