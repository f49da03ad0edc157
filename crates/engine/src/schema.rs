//! Validation schemas.
//!
//! A [`Schema`] lists one [`FieldRule`] per field of an entity kind. Each
//! rule starts from a base type rule ([`FieldType`]) and carries the
//! declarative constraints layered on top of it: required/default,
//! read-only, numeric bounds, a coercion, and the time bound.
//!
//! Schemas are assembled along the model hierarchy: every kind starts from
//! the rules shared by all entities, named kinds add the slug, and each
//! kind then adds (or overrides) its own rules.

use sportsdb_core::{
    EntityId, EntityKind, EventStatus, EventType, FieldValue, Outcome,
};

use crate::config::SportsDbConfig;

/// Base type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Bool,
    Integer,
    /// Integer restricted to the listed `(name, value)` members.
    Enum(&'static [(&'static str, i64)]),
    Float,
    Timestamp,
    /// A timestamp, or the "not set yet" sentinel.
    OptionalTimestamp,
    /// Id of an entity of the given kind.
    Reference(EntityKind),
    /// Ordered ids of entities of the given kind.
    References(EntityKind),
}

impl FieldType {
    /// Kind referenced by this field, if it is a reference.
    pub fn target(&self) -> Option<EntityKind> {
        match self {
            FieldType::Reference(kind) | FieldType::References(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, FieldType::References(_))
    }
}

/// Value normalization applied before bounds are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Round half away from zero to `places` decimal places.
    Round { places: u32 },
}

impl Coercion {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Coercion::Round { places } => round_half_away(x, *places),
        }
    }
}

/// Round `x` to `places` decimals, half away from zero.
///
/// The decision uses the exact decimal expansion of the binary value, so
/// `1.005` (stored as 1.00499999999999989…) rounds down to `1.0` while the
/// exact tie `0.125` rounds up to `0.13`. Negative zero comes back as `0.0`.
pub fn round_half_away(x: f64, places: u32) -> f64 {
    if !x.is_finite() || x.abs() >= 1e15 {
        return x;
    }
    let places = places as usize;
    // 60 extra digits keep the decisive digit exact for any f64 >= 1e-9.
    let digits = format!("{:.*}", places + 60, x.abs());
    let (int_part, frac) = digits.split_once('.').unwrap_or((&digits, ""));
    let (kept, rest) = frac.split_at(places.min(frac.len()));

    let mut scaled: u128 = match format!("{}{}", int_part, kept).parse() {
        Ok(n) => n,
        Err(_) => return x,
    };
    if rest.as_bytes().first().is_some_and(|&d| d >= b'5') {
        scaled += 1;
    }

    let rounded: f64 = format!("{}e-{}", scaled, places).parse().unwrap_or(x.abs());
    if rounded == 0.0 {
        0.0
    } else if x < 0.0 {
        -rounded
    } else {
        rounded
    }
}

/// Constraints on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: &'static str,
    pub ty: FieldType,
    /// Must be present, no default.
    pub required: bool,
    /// Value used when the field is not supplied.
    pub default: Option<FieldValue>,
    /// Computed by the store; callers may not supply it.
    pub derived: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub coerce: Option<Coercion>,
    /// Text must not be empty.
    pub non_empty: bool,
    /// Timestamp must not lie before the validation time. Only checked
    /// when the caller supplies the field.
    pub not_before_now: bool,
}

impl FieldRule {
    /// An optional field with no constraints beyond its type.
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            default: None,
            derived: false,
            min: None,
            max: None,
            coerce: None,
            non_empty: false,
            not_before_now: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn coerce(mut self, coercion: Coercion) -> Self {
        self.coerce = Some(coercion);
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn not_before_now(mut self) -> Self {
        self.not_before_now = true;
        self
    }

    /// Must a stored entity carry this field?
    pub fn stored_required(&self) -> bool {
        self.required || self.derived
    }
}

/// Field rules of one entity kind, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: EntityKind,
    rules: Vec<FieldRule>,
}

impl Schema {
    /// An empty schema.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            rules: Vec::new(),
        }
    }

    /// Add rules; a rule for an existing field replaces it in place.
    pub fn extend(mut self, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        for rule in rules {
            match self.rules.iter().position(|r| r.name == rule.name) {
                Some(i) => self.rules[i] = rule,
                None => self.rules.push(rule),
            }
        }
        self
    }

    /// The schema of `kind` under `config`.
    pub fn for_kind(kind: EntityKind, config: &SportsDbConfig) -> Self {
        let base = Schema::new(kind).extend(model_rules());
        match kind {
            EntityKind::Sport => base.extend(named_rules()).extend(sport_rules()),
            EntityKind::Event => base.extend(named_rules()).extend(event_rules()),
            EntityKind::Selection => base.extend(selection_rules(config)),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == field)
    }

    /// Names of the id-collection fields.
    pub fn collections(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules
            .iter()
            .filter(|r| r.ty.is_collection())
            .map(|r| r.name)
    }

    /// The collection field of this kind that holds children of `child`.
    pub fn collection_of(&self, child: EntityKind) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|r| r.ty == FieldType::References(child))
            .map(|r| r.name)
    }

    /// The field of this kind that references its parent.
    pub fn parent_field(&self) -> Option<&'static str> {
        let parent = self.kind.parent()?;
        self.rules
            .iter()
            .find(|r| r.ty == FieldType::Reference(parent))
            .map(|r| r.name)
    }
}

// =============================================================================
// Rule sets
// =============================================================================

/// Rules shared by every entity.
fn model_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("name", FieldType::Text).required().non_empty(),
        FieldRule::new("active", FieldType::Bool).default_value(FieldValue::Bool(false)),
    ]
}

/// Rules of entities that carry a slug.
fn named_rules() -> Vec<FieldRule> {
    vec![FieldRule::new("slug", FieldType::Text).derived()]
}

fn ids(kind: EntityKind, name: &'static str) -> FieldRule {
    FieldRule::new(name, FieldType::References(kind))
        .default_value(FieldValue::Ids(Vec::<EntityId>::new()))
}

fn sport_rules() -> Vec<FieldRule> {
    vec![ids(EntityKind::Event, "events")]
}

fn event_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new("type", FieldType::Enum(EventType::MEMBERS)).required(),
        FieldRule::new("status", FieldType::Enum(EventStatus::MEMBERS)).required(),
        FieldRule::new("sport", FieldType::Reference(EntityKind::Sport)).required(),
        FieldRule::new("scheduled_start", FieldType::Timestamp)
            .required()
            .not_before_now(),
        FieldRule::new("actual_start", FieldType::OptionalTimestamp)
            .default_value(FieldValue::Absent),
        ids(EntityKind::Selection, "selections"),
    ]
}

fn selection_rules(config: &SportsDbConfig) -> Vec<FieldRule> {
    vec![
        FieldRule::new("event", FieldType::Reference(EntityKind::Event)).required(),
        FieldRule::new("price", FieldType::Float)
            .required()
            .coerce(Coercion::Round {
                places: config.price_places,
            })
            .min(0.0),
        FieldRule::new("outcome", FieldType::Enum(Outcome::MEMBERS)).required(),
    ]
}
