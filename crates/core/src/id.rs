//! Entity identifiers.
//!
//! Ids are 64-bit integers laid out as `(unix_millis << 20) | sequence`.
//! A process-wide generator hands them out strictly increasing, so ids are
//! unique within the process and sort in creation order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Number of low bits reserved for the per-millisecond sequence.
const SEQUENCE_BITS: u32 = 20;

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of a Sport, Event or Selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Generate a fresh, time-ordered id.
    ///
    /// Never returns a value less than or equal to a previously generated
    /// id, even if the wall clock steps backwards.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let candidate = millis << SEQUENCE_BITS;
        let mut last = LAST_ID.load(Ordering::Acquire);
        loop {
            let next = candidate.max(last + 1);
            match LAST_ID.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return EntityId(next),
                Err(observed) => last = observed,
            }
        }
    }

    /// Make every later [`generate`](Self::generate) in this process return
    /// an id greater than `self`. Used for ids loaded from storage, which a
    /// clock that stepped backwards could otherwise hand out again.
    pub fn mark_used(self) {
        LAST_ID.fetch_max(self.0, Ordering::AcqRel);
    }

    /// Wrap an existing raw id.
    pub const fn from_raw(raw: u64) -> Self {
        EntityId(raw)
    }

    /// The raw integer value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(EntityId)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        EntityId(raw)
    }
}
