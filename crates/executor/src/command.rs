//! Commands accepted by the [`Executor`](crate::Executor).
//!
//! A request arrives as `(operation, kind, arguments)`:
//!
//! | operation | arguments |
//! |---|---|
//! | `create` | JSON object of attributes |
//! | `update` | id, JSON object of attributes |
//! | `deactivate`, `activate`, `get` | id |
//! | `filter` | filter expression (may be empty) |

use serde_json::{Map, Value};
use sportsdb_core::{EntityId, EntityKind};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create {
        kind: EntityKind,
        attrs: Map<String, Value>,
    },
    Update {
        kind: EntityKind,
        id: EntityId,
        attrs: Map<String, Value>,
    },
    Deactivate {
        kind: EntityKind,
        id: EntityId,
    },
    Activate {
        kind: EntityKind,
        id: EntityId,
    },
    Get {
        kind: EntityKind,
        id: EntityId,
    },
    Filter {
        kind: EntityKind,
        expression: String,
    },
}

impl Command {
    /// Build a command from an operation name, a kind and raw arguments.
    pub fn parse(operation: &str, kind: &str, args: &[String]) -> Result<Self> {
        let kind: EntityKind = kind.parse().map_err(Error::from)?;
        let command = match operation.to_ascii_lowercase().as_str() {
            "create" => {
                let [attrs] = exact::<1>(operation, args)?;
                Command::Create {
                    kind,
                    attrs: parse_attrs(attrs)?,
                }
            }
            "update" => {
                let [id, attrs] = exact::<2>(operation, args)?;
                Command::Update {
                    kind,
                    id: parse_id(id)?,
                    attrs: parse_attrs(attrs)?,
                }
            }
            "deactivate" => Command::Deactivate {
                kind,
                id: parse_id(single(operation, args)?)?,
            },
            "activate" => Command::Activate {
                kind,
                id: parse_id(single(operation, args)?)?,
            },
            "get" => Command::Get {
                kind,
                id: parse_id(single(operation, args)?)?,
            },
            "filter" => Command::Filter {
                kind,
                expression: args.join(" "),
            },
            other => {
                return Err(Error::InvalidInput {
                    reason: format!(
                        "unknown operation '{}' (expected create, update, deactivate, activate, get or filter)",
                        other
                    ),
                })
            }
        };
        Ok(command)
    }

    /// Does this command write to the store?
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::Get { .. } | Command::Filter { .. })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Command::Create { kind, .. }
            | Command::Update { kind, .. }
            | Command::Deactivate { kind, .. }
            | Command::Activate { kind, .. }
            | Command::Get { kind, .. }
            | Command::Filter { kind, .. } => *kind,
        }
    }

    /// Operation name, as accepted by [`Command::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Update { .. } => "update",
            Command::Deactivate { .. } => "deactivate",
            Command::Activate { .. } => "activate",
            Command::Get { .. } => "get",
            Command::Filter { .. } => "filter",
        }
    }
}

fn exact<'a, const N: usize>(operation: &str, args: &'a [String]) -> Result<[&'a String; N]> {
    let refs: Vec<&String> = args.iter().collect();
    refs.try_into().map_err(|got: Vec<&String>| Error::InvalidInput {
        reason: format!("{} takes {} argument(s), got {}", operation, N, got.len()),
    })
}

fn single<'a>(operation: &str, args: &'a [String]) -> Result<&'a String> {
    let [arg] = exact::<1>(operation, args)?;
    Ok(arg)
}

fn parse_id(raw: &str) -> Result<EntityId> {
    raw.trim().parse().map_err(|_| Error::InvalidInput {
        reason: format!("'{}' is not an entity id", raw),
    })
}

fn parse_attrs(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::InvalidInput {
            reason: format!("attributes must be a JSON object, got {}", other),
        }),
        Err(e) => Err(Error::InvalidInput {
            reason: format!("attributes are not valid JSON: {}", e),
        }),
    }
}
