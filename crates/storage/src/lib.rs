//! Storage layer for sportsdb
//!
//! This crate defines the key-value capability set the persistence core
//! depends on, and ships an in-memory implementation of it:
//! - [`KvStore`]: scalar GET/SET, list LPUSH/LRANGE, KEYS and MGET
//! - [`MemoryStore`]: sharded in-memory store with optional JSON snapshots
//! - [`glob_match`]: the pattern language used by KEYS

#![warn(clippy::all)]

pub mod glob;
pub mod memory;
pub mod traits;

pub use glob::glob_match;
pub use memory::MemoryStore;
pub use traits::KvStore;
