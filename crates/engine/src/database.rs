//! Database handle shared by every store operation.
//!
//! A [`Database`] owns the key-value store, the configuration, the
//! validation schemas built from that configuration, and the per-sport
//! locks used by cascades. It is cheap to share behind an `Arc`.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use sportsdb_core::{truncate_to_micros, EntityId, EntityKind, SportsResult, Timestamp};
use sportsdb_storage::{KvStore, MemoryStore};
use tracing::{debug, info};

use crate::cascade::RootLocks;
use crate::config::SportsDbConfig;
use crate::keys;
use crate::schema::Schema;

pub struct Database {
    store: Arc<dyn KvStore>,
    config: SportsDbConfig,
    schemas: [Schema; 3],
    locks: Option<RootLocks>,
}

impl Database {
    /// An in-memory database with the default configuration.
    pub fn cache() -> SportsResult<Arc<Self>> {
        Self::with_store(Arc::new(MemoryStore::new()), SportsDbConfig::default())
    }

    /// Open a database as configured. With a snapshot path the in-memory
    /// store is loaded from (and flushed to) that file.
    pub fn open(config: SportsDbConfig) -> SportsResult<Arc<Self>> {
        let store = match &config.snapshot_path {
            Some(path) => {
                info!(path = %path.display(), "Opening snapshot");
                MemoryStore::open(path)?
            }
            None => MemoryStore::new(),
        };
        Self::with_store(Arc::new(store), config)
    }

    /// A database over an existing store.
    pub fn with_store(store: Arc<dyn KvStore>, config: SportsDbConfig) -> SportsResult<Arc<Self>> {
        config.validate()?;
        reserve_stored_ids(&*store)?;
        let schemas = EntityKind::ALL.map(|kind| Schema::for_kind(kind, &config));
        let locks = config.cascade_locking.then(RootLocks::new);
        Ok(Arc::new(Self {
            store,
            config,
            schemas,
            locks,
        }))
    }

    pub fn store(&self) -> &dyn KvStore {
        &*self.store
    }

    pub fn config(&self) -> &SportsDbConfig {
        &self.config
    }

    pub fn schema(&self, kind: EntityKind) -> &Schema {
        &self.schemas[kind_index(kind)]
    }

    /// Per-sport locks, when cascade locking is enabled.
    pub fn root_locks(&self) -> Option<&RootLocks> {
        self.locks.as_ref()
    }

    /// The current time at stored precision.
    pub fn now(&self) -> Timestamp {
        truncate_to_micros(Utc::now())
    }

    /// Persist the store, if it persists anything.
    pub fn flush(&self) -> SportsResult<()> {
        self.store.flush()
    }
}

/// Keep the id generator ahead of every entity already in `store`.
fn reserve_stored_ids(store: &dyn KvStore) -> SportsResult<()> {
    let mut latest: Option<EntityId> = None;
    for kind in EntityKind::ALL {
        let ids = store
            .keys(&keys::name_pattern(kind))?
            .into_iter()
            .filter_map(|key| keys::parse_name_key(kind, &key));
        latest = latest.into_iter().chain(ids).max();
    }
    if let Some(id) = latest {
        id.mark_used();
        debug!(latest = %id, "Reserved stored ids");
    }
    Ok(())
}

fn kind_index(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Sport => 0,
        EntityKind::Event => 1,
        EntityKind::Selection => 2,
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("cascade_locking", &self.locks.is_some())
            .finish_non_exhaustive()
    }
}
