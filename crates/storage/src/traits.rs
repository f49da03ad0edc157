//! The key-value capability set.

use std::sync::Arc;

use sportsdb_core::SportsResult;

/// A schemaless key-value store with string and list values.
///
/// Each call is one store command. Implementations must serialize
/// individual commands; nothing here is transactional across keys.
pub trait KvStore: Send + Sync {
    /// `GET key`. Returns `None` if the key does not exist.
    ///
    /// Fails with `WrongType` if the key holds a list.
    fn get(&self, key: &str) -> SportsResult<Option<String>>;

    /// `SET key value`. Overwrites any existing value, whatever its type.
    fn set(&self, key: &str, value: &str) -> SportsResult<()>;

    /// `LPUSH key v1 v2 ...`. Each value is pushed onto the head in turn,
    /// so the last value ends up first. Returns the new list length.
    ///
    /// Fails with `WrongType` if the key holds a string.
    fn lpush(&self, key: &str, values: &[String]) -> SportsResult<usize>;

    /// `LRANGE key start stop`, inclusive on both ends. Negative indices
    /// count from the tail (`-1` is the last element). A missing key reads
    /// as an empty list.
    fn lrange(&self, key: &str, start: i64, stop: i64) -> SportsResult<Vec<String>>;

    /// `KEYS pattern`, using the glob syntax of [`crate::glob_match`].
    fn keys(&self, pattern: &str) -> SportsResult<Vec<String>>;

    /// `MGET k1 k2 ...`. One entry per key, `None` for missing keys and for
    /// keys that do not hold a string.
    fn mget(&self, keys: &[String]) -> SportsResult<Vec<Option<String>>>;

    /// Persist buffered state, for stores that buffer any.
    fn flush(&self) -> SportsResult<()> {
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &str) -> SportsResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> SportsResult<()> {
        (**self).set(key, value)
    }

    fn lpush(&self, key: &str, values: &[String]) -> SportsResult<usize> {
        (**self).lpush(key, values)
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> SportsResult<Vec<String>> {
        (**self).lrange(key, start, stop)
    }

    fn keys(&self, pattern: &str) -> SportsResult<Vec<String>> {
        (**self).keys(pattern)
    }

    fn mget(&self, keys: &[String]) -> SportsResult<Vec<Option<String>>> {
        (**self).mget(keys)
    }

    fn flush(&self) -> SportsResult<()> {
        (**self).flush()
    }
}
