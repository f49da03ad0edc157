//! sportsdb: field-per-key persistence for a Sport → Event → Selection
//! hierarchy.
//!
//! Every entity is stored as one key per field (`{kind}:{id}:{field}`) in a
//! Redis-shaped key-value store. Creates and updates are validated and their
//! references checked before anything is written; deactivation cascades up
//! the hierarchy; filters discover entities by key pattern.
//!
//! # Quick start
//!
//! ```no_run
//! use serde_json::json;
//! use sportsdb::{EntityKind, SportsDb};
//!
//! let db = SportsDb::cache()?;
//! let sport = db.create(EntityKind::Sport, json!({"name": "Football", "active": true}))?;
//! let found = db.filter(EntityKind::Sport, "regex:^Foot")?;
//! assert_eq!(found[0].id(), sport.id());
//! # Ok::<(), sportsdb::Error>(())
//! ```
//!
//! [`SportsDb`] speaks in commands and JSON attribute maps. For typed access
//! to [`Sport`], [`Event`] and [`Selection`], use [`SportsDb::store`].

use std::sync::Arc;

use serde_json::{Map, Value};

pub use sportsdb_core::{
    EntityId, EntityKind, Event, EventStatus, EventType, Outcome, Selection, Sport, StartTime,
};
pub use sportsdb_engine::{AnyEntity, Database, Entity, EntityStore, SportsDbConfig};
pub use sportsdb_executor::{Command, EntityRecord, Error, Executor, Output, Result};
pub use sportsdb_storage::{KvStore, MemoryStore};

/// Handle to a sportsdb database.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct SportsDb {
    executor: Executor,
    store: EntityStore,
}

impl SportsDb {
    // =========================================================================
    // Opening
    // =========================================================================

    /// An empty in-memory database with default configuration.
    pub fn cache() -> Result<Self> {
        Self::from_database(Database::cache().map_err(Error::from)?)
    }

    /// Open a database; loads the snapshot at `config.snapshot_path` if set.
    pub fn open(config: SportsDbConfig) -> Result<Self> {
        Self::from_database(Database::open(config).map_err(Error::from)?)
    }

    /// Wrap an already-open [`Database`].
    pub fn from_database(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            executor: Executor::new(db.clone()),
            store: EntityStore::new(db),
        })
    }

    pub fn database(&self) -> &Arc<Database> {
        self.executor.database()
    }

    /// Typed entity access.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Run a raw command.
    pub fn execute(&self, command: Command) -> Result<Output> {
        self.executor.execute(command)
    }

    /// Write the snapshot, if the database has one.
    pub fn flush(&self) -> Result<()> {
        self.executor.flush()
    }

    // =========================================================================
    // Entity Operations
    // =========================================================================

    /// Create an entity from a JSON object of attributes.
    pub fn create(&self, kind: EntityKind, attrs: Value) -> Result<EntityRecord> {
        let attrs = into_attrs(attrs)?;
        self.expect_entity(Command::Create { kind, attrs }, "Create")
    }

    /// Apply a partial update.
    pub fn update(&self, kind: EntityKind, id: EntityId, attrs: Value) -> Result<EntityRecord> {
        let attrs = into_attrs(attrs)?;
        self.expect_entity(Command::Update { kind, id, attrs }, "Update")
    }

    pub fn get(&self, kind: EntityKind, id: EntityId) -> Result<EntityRecord> {
        self.expect_entity(Command::Get { kind, id }, "Get")
    }

    // =========================================================================
    // Lifecycle Operations
    // =========================================================================

    /// Deactivate an entity and cascade to its ancestors.
    ///
    /// Returns the targeted entity as stored after the cascade.
    pub fn deactivate(&self, kind: EntityKind, id: EntityId) -> Result<EntityRecord> {
        self.expect_entity(Command::Deactivate { kind, id }, "Deactivate")
    }

    /// Mark one entity active. Does not cascade.
    pub fn activate(&self, kind: EntityKind, id: EntityId) -> Result<EntityRecord> {
        self.expect_entity(Command::Activate { kind, id }, "Activate")
    }

    // =========================================================================
    // Query Operations
    // =========================================================================

    /// Entities of `kind` matching a filter expression, in id order.
    pub fn filter(&self, kind: EntityKind, expression: &str) -> Result<Vec<EntityRecord>> {
        let command = Command::Filter {
            kind,
            expression: expression.to_string(),
        };
        match self.executor.execute(command)? {
            Output::Entities(records) => Ok(records),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Filter".into(),
            }),
        }
    }

    fn expect_entity(&self, command: Command, name: &str) -> Result<EntityRecord> {
        match self.executor.execute(command)? {
            Output::Entity(record) => Ok(record),
            _ => Err(Error::Internal {
                reason: format!("Unexpected output for {}", name),
            }),
        }
    }
}

impl std::fmt::Debug for SportsDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SportsDb")
            .field("database", self.database())
            .finish()
    }
}

fn into_attrs(attrs: Value) -> Result<Map<String, Value>> {
    match attrs {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidInput {
            reason: format!("attributes must be a JSON object, got {}", other),
        }),
    }
}
