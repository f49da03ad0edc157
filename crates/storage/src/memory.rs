//! Sharded in-memory key-value store
//!
//! Keys are partitioned by namespace, the part of the key before the first
//! `:` (for entity keys, the entity kind). Each namespace gets its own shard
//! with an FxHashMap for O(1) lookups.
//!
//! # Design
//!
//! - DashMap: sharded by namespace, lock-free reads
//! - FxHashMap: O(1) lookups, fast non-crypto hash
//! - Per-namespace: `KEYS sport:*` only scans the sport shard
//!
//! # Persistence
//!
//! A store opened with [`MemoryStore::open`] loads a JSON snapshot and
//! writes it back on [`MemoryStore::write_snapshot`] (also reachable as
//! [`KvStore::flush`]). The write goes to a temporary
//! file that is then renamed over the snapshot, so a crash never leaves a
//! truncated snapshot behind.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sportsdb_core::{SportsError, SportsResult};
use tracing::{debug, info, warn};

use crate::glob::glob_match;
use crate::traits::KvStore;

/// Snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

/// A value held under one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// A string value.
    String(String),
    /// A list value, head first.
    List(VecDeque<String>),
}

impl StoredValue {
    fn type_name(&self) -> &'static str {
        match self {
            StoredValue::String(_) => "string",
            StoredValue::List(_) => "list",
        }
    }
}

/// Per-namespace shard
#[derive(Debug, Default)]
pub struct Shard {
    pub(crate) data: FxHashMap<String, StoredValue>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of keys in this shard
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    entries: BTreeMap<String, StoredValue>,
}

/// In-memory [`KvStore`] with Redis-like semantics.
///
/// # Thread Safety
///
/// All operations are thread-safe. Each command locks at most one shard,
/// so every single command is atomic; sequences of commands are not.
///
/// # Example
///
/// ```ignore
/// use sportsdb_storage::{KvStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("sport:1:name", "Football")?;
/// assert_eq!(store.get("sport:1:name")?, Some("Football".into()));
/// ```
pub struct MemoryStore {
    shards: DashMap<String, Shard>,
    /// Number of commands served
    commands: AtomicU64,
    /// Snapshot location, if persistent
    path: Option<PathBuf>,
    /// Serializes concurrent flushes
    flush_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create an empty, purely in-memory store.
    pub fn new() -> Self {
        Self {
            shards: DashMap::new(),
            commands: AtomicU64::new(0),
            path: None,
            flush_lock: Mutex::new(()),
        }
    }

    /// Open a snapshot-backed store.
    ///
    /// Loads the snapshot at `path` if it exists; otherwise starts empty and
    /// creates the file on the first [`write_snapshot`](Self::write_snapshot).
    pub fn open(path: impl AsRef<Path>) -> SportsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self::new();

        if path.exists() {
            let bytes = fs::read(&path)
                .map_err(|e| SportsError::io(format!("cannot read {}", path.display()), e))?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            if snapshot.version != SNAPSHOT_VERSION {
                return Err(SportsError::serialization(format!(
                    "unsupported snapshot version {} in {}",
                    snapshot.version,
                    path.display()
                )));
            }
            let count = snapshot.entries.len();
            for (key, value) in snapshot.entries {
                store
                    .shards
                    .entry(namespace(&key).to_string())
                    .or_default()
                    .data
                    .insert(key, value);
            }
            info!(path = %path.display(), keys = count, "Loaded snapshot");
        } else {
            debug!(path = %path.display(), "No snapshot found, starting empty");
        }

        store.path = Some(path);
        Ok(store)
    }

    /// Write the snapshot, if this store is snapshot-backed.
    pub fn write_snapshot(&self) -> SportsResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _guard = self.flush_lock.lock();

        let mut entries = BTreeMap::new();
        for shard in self.shards.iter() {
            for (key, value) in shard.data.iter() {
                entries.insert(key.clone(), value.clone());
            }
        }
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            entries,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)
            .map_err(|e| SportsError::io(format!("cannot write {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .map_err(|e| SportsError::io(format!("cannot replace {}", path.display()), e))?;

        debug!(path = %path.display(), keys = snapshot.entries.len(), "Flushed snapshot");
        Ok(())
    }

    /// Snapshot location, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of commands served since creation.
    #[inline]
    pub fn command_count(&self) -> u64 {
        self.commands.load(Ordering::Acquire)
    }

    /// Get number of shards (namespaces)
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Get total number of keys across all shards
    pub fn len(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the raw value under `key`, without counting a command.
    pub fn peek(&self, key: &str) -> Option<StoredValue> {
        self.shards
            .get(namespace(key))
            .and_then(|shard| shard.data.get(key).cloned())
    }

    #[inline]
    fn count(&self, command: &str, key: &str) {
        self.commands.fetch_add(1, Ordering::AcqRel);
        debug!(command, key, "Store command");
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> SportsResult<Option<String>> {
        self.count("GET", key);
        match self.peek(key) {
            None => Ok(None),
            Some(StoredValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(SportsError::wrong_type(key, "string", other.type_name())),
        }
    }

    fn set(&self, key: &str, value: &str) -> SportsResult<()> {
        self.count("SET", key);
        self.shards
            .entry(namespace(key).to_string())
            .or_default()
            .data
            .insert(key.to_string(), StoredValue::String(value.to_string()));
        Ok(())
    }

    fn lpush(&self, key: &str, values: &[String]) -> SportsResult<usize> {
        self.count("LPUSH", key);
        let mut shard = self.shards.entry(namespace(key).to_string()).or_default();
        let entry = shard
            .data
            .entry(key.to_string())
            .or_insert_with(|| StoredValue::List(VecDeque::new()));
        match entry {
            StoredValue::List(list) => {
                for value in values {
                    list.push_front(value.clone());
                }
                Ok(list.len())
            }
            other => Err(SportsError::wrong_type(key, "list", other.type_name())),
        }
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> SportsResult<Vec<String>> {
        self.count("LRANGE", key);
        let list = match self.peek(key) {
            None => return Ok(Vec::new()),
            Some(StoredValue::List(list)) => list,
            Some(other) => return Err(SportsError::wrong_type(key, "list", other.type_name())),
        };

        let len = list.len() as i64;
        let start = if start < 0 { (len + start).max(0) } else { start };
        let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(list
            .into_iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .collect())
    }

    fn keys(&self, pattern: &str) -> SportsResult<Vec<String>> {
        self.count("KEYS", pattern);
        let mut found = Vec::new();
        match literal_namespace(pattern) {
            Some(ns) => {
                if let Some(shard) = self.shards.get(ns) {
                    found.extend(shard.data.keys().filter(|k| glob_match(pattern, k)).cloned());
                }
            }
            None => {
                for shard in self.shards.iter() {
                    found.extend(shard.data.keys().filter(|k| glob_match(pattern, k)).cloned());
                }
            }
        }
        found.sort();
        Ok(found)
    }

    fn mget(&self, keys: &[String]) -> SportsResult<Vec<Option<String>>> {
        self.count("MGET", &format!("{} keys", keys.len()));
        Ok(keys
            .iter()
            .map(|key| match self.peek(key) {
                Some(StoredValue::String(s)) => Some(s),
                _ => None,
            })
            .collect())
    }

    fn flush(&self) -> SportsResult<()> {
        self.write_snapshot()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        if self.path.is_some() {
            if let Err(e) = self.write_snapshot() {
                warn!(error = %e, "Failed to flush snapshot on drop");
            }
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("shard_count", &self.shard_count())
            .field("total_keys", &self.len())
            .field("commands", &self.command_count())
            .field("path", &self.path)
            .finish()
    }
}

/// The shard a key lives in.
fn namespace(key: &str) -> &str {
    key.split_once(':').map_or(key, |(ns, _)| ns)
}

/// The namespace every key matching `pattern` must live in, if the pattern
/// fixes it (no glob metacharacters before the first `:`).
fn literal_namespace(pattern: &str) -> Option<&str> {
    let (ns, _) = pattern.split_once(':')?;
    if ns.contains(['*', '?', '[', '\\']) {
        None
    } else {
        Some(ns)
    }
}
