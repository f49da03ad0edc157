//! Filter engine: pattern-based discovery without an index.
//!
//! A filter expression is a list of clauses joined by [`CONJUNCTION`]:
//!
//! ```text
//! regex:^Sport 1 AND events:<<5
//! ```
//!
//! - `regex:<pattern>` keeps entities whose name matches the pattern,
//!   anchored at the start
//! - `<collection>:<op><n>` compares the size of an id collection, with
//!   `op` one of `<<`, `<=`, `>>`, `>=`, `==`
//!
//! Evaluation discovers every entity of the kind (`KEYS` on the name
//! pattern, one `MGET` of the names), loads each, then applies the clauses
//! in order. Results come back in id order.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use sportsdb_core::{EntityId, EntityKind, Event, Selection, SportsError, SportsResult, Sport};
use tracing::debug;

use crate::entity::{AnyEntity, Entity};
use crate::keys;
use crate::schema::Schema;
use crate::store::EntityStore;

/// Joins clauses. Surrounded by spaces so patterns may contain spaces.
pub const CONJUNCTION: &str = " AND ";

const REGEX_VERB: &str = "regex";

/// Pattern used for discovery, before any clause applies.
const MATCH_ALL: &str = ".*";

/// Collection size comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl CountOp {
    const ALL: [CountOp; 5] = [CountOp::Lt, CountOp::Le, CountOp::Gt, CountOp::Ge, CountOp::Eq];

    pub fn symbol(&self) -> &'static str {
        match self {
            CountOp::Lt => "<<",
            CountOp::Le => "<=",
            CountOp::Gt => ">>",
            CountOp::Ge => ">=",
            CountOp::Eq => "==",
        }
    }

    pub fn compare(&self, count: usize, value: usize) -> bool {
        match self {
            CountOp::Lt => count < value,
            CountOp::Le => count <= value,
            CountOp::Gt => count > value,
            CountOp::Ge => count >= value,
            CountOp::Eq => count == value,
        }
    }
}

impl fmt::Display for CountOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One parsed filter clause.
#[derive(Debug, Clone)]
pub enum Clause {
    /// Name matches the pattern, anchored at the start.
    Name(Regex),
    /// Size of the named collection compared against a number.
    Count {
        field: &'static str,
        op: CountOp,
        value: usize,
    },
}

impl Clause {
    /// Parse one `verb:argument` clause for entities described by `schema`.
    pub fn parse(clause: &str, schema: &Schema) -> SportsResult<Self> {
        let clause = clause.trim();
        if clause.is_empty() {
            return Err(SportsError::filter(clause, "empty clause"));
        }
        let Some((verb, argument)) = clause.split_once(':') else {
            return Err(SportsError::filter(clause, "expected verb:argument"));
        };

        if verb == REGEX_VERB {
            let regex = Regex::new(&format!("^(?:{})", argument))
                .map_err(|e| SportsError::filter(clause, format!("invalid pattern: {}", e)))?;
            return Ok(Clause::Name(regex));
        }

        let Some(field) = schema.collections().find(|f| *f == verb) else {
            return Err(SportsError::filter(
                verb,
                format!("unknown filter verb for {}", schema.kind()),
            ));
        };
        let Some(op) = CountOp::ALL.into_iter().find(|op| argument.starts_with(op.symbol())) else {
            return Err(SportsError::filter(
                clause,
                "expected one of <<, <=, >>, >=, ==",
            ));
        };
        let number = &argument[op.symbol().len()..];
        let value = usize::from_str(number.trim())
            .map_err(|_| SportsError::filter(clause, format!("'{}' is not a count", number)))?;
        Ok(Clause::Count { field, op, value })
    }

    /// Does `entity` satisfy this clause?
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        match self {
            Clause::Name(regex) => regex.is_match(entity.name()),
            Clause::Count { field, op, value } => {
                let count = entity.collection(field).map_or(0, <[EntityId]>::len);
                op.compare(count, *value)
            }
        }
    }
}

/// A parsed filter expression. The empty expression matches everything.
#[derive(Debug, Clone)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn parse(expression: &str, schema: &Schema) -> SportsResult<Self> {
        if expression.trim().is_empty() {
            return Ok(Self { clauses: Vec::new() });
        }
        let clauses = expression
            .split(CONJUNCTION)
            .map(|clause| Clause::parse(clause, schema))
            .collect::<SportsResult<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Apply each clause in turn to the survivors of the previous one.
    pub fn apply<E: Entity>(&self, mut entities: Vec<E>) -> Vec<E> {
        for clause in &self.clauses {
            entities.retain(|e| clause.matches(e));
        }
        entities
    }
}

impl EntityStore {
    /// Every entity of kind `E` matching `expression`, in id order.
    pub fn filter<E: Entity>(&self, expression: &str) -> SportsResult<Vec<E>> {
        let filter = Filter::parse(expression, self.db.schema(E::KIND))?;
        let everything = Regex::new(&format!("^(?:{})", MATCH_ALL))
            .map_err(|e| SportsError::filter(MATCH_ALL, e.to_string()))?;
        let ids = self.discover(E::KIND, &everything)?;

        let mut entities = Vec::with_capacity(ids.len());
        for id in ids {
            match self.load::<E>(id) {
                Ok(entity) => entities.push(entity),
                // Deleted or half-written between discovery and load.
                Err(e) if e.is_not_found() => {
                    debug!(entity = %E::KIND, id = %id, error = %e, "Skipping entity");
                }
                Err(e) => return Err(e),
            }
        }

        let mut matched = filter.apply(entities);
        matched.sort_by_key(Entity::id);
        debug!(
            entity = %E::KIND,
            expression = %expression,
            matched = matched.len(),
            "Filter evaluated"
        );
        Ok(matched)
    }

    pub fn filter_any(&self, kind: EntityKind, expression: &str) -> SportsResult<Vec<AnyEntity>> {
        fn any<E: Entity>(entities: Vec<E>) -> Vec<AnyEntity> {
            entities.into_iter().map(Entity::into_any).collect()
        }
        match kind {
            EntityKind::Sport => self.filter::<Sport>(expression).map(any),
            EntityKind::Event => self.filter::<Event>(expression).map(any),
            EntityKind::Selection => self.filter::<Selection>(expression).map(any),
        }
    }

    /// Ids of every entity of `kind` whose name matches `pattern`.
    ///
    /// Lists the name keys of the kind, then reads every name in one batch.
    fn discover(&self, kind: EntityKind, pattern: &Regex) -> SportsResult<Vec<EntityId>> {
        let store = self.db.store();
        let name_keys = store.keys(&keys::name_pattern(kind))?;
        let names = store.mget(&name_keys)?;

        let mut ids = Vec::with_capacity(name_keys.len());
        for (key, name) in name_keys.iter().zip(names) {
            let (Some(id), Some(name)) = (keys::parse_name_key(kind, key), name) else {
                continue;
            };
            if pattern.is_match(&name) {
                ids.push(id);
            }
        }
        debug!(entity = %kind, candidates = ids.len(), "Discovered entities");
        Ok(ids)
    }
}
