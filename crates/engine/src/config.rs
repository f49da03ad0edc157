//! Database configuration.
//!
//! Loaded from a TOML file or defaulted. Every key is optional:
//!
//! ```toml
//! price_places = 2
//! cascade_locking = true
//! snapshot_path = "sports.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sportsdb_core::{SportsError, SportsResult};

/// Upper bound for `price_places`.
pub const MAX_PRICE_PLACES: u32 = 9;

/// Configuration of a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SportsDbConfig {
    /// Decimal places prices are rounded to during validation.
    pub price_places: u32,

    /// Serialize cascades and activation changes per sport.
    pub cascade_locking: bool,

    /// Where the in-memory store keeps its snapshot, if anywhere.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SportsDbConfig {
    fn default() -> Self {
        Self {
            price_places: 2,
            cascade_locking: true,
            snapshot_path: None,
        }
    }
}

impl SportsDbConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price rounding precision
    pub fn with_price_places(mut self, places: u32) -> Self {
        self.price_places = places;
        self
    }

    /// Enable or disable per-sport cascade locking
    pub fn with_cascade_locking(mut self, enabled: bool) -> Self {
        self.cascade_locking = enabled;
        self
    }

    /// Set the snapshot location
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> SportsResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SportsError::invalid_input(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> SportsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SportsError::io(format!("cannot read {}", path.display()), e))?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges.
    pub fn validate(&self) -> SportsResult<()> {
        if self.price_places > MAX_PRICE_PLACES {
            return Err(SportsError::invalid_input(format!(
                "price_places must be at most {}, got {}",
                MAX_PRICE_PLACES, self.price_places
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SportsDbConfig::default();
        assert_eq!(config.price_places, 2);
        assert!(config.cascade_locking);
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SportsDbConfig::from_toml_str("cascade_locking = false").unwrap();
        assert!(!config.cascade_locking);
        assert_eq!(config.price_places, 2);
    }

    #[test]
    fn full_toml() {
        let config = SportsDbConfig::from_toml_str(
            "price_places = 3\ncascade_locking = true\nsnapshot_path = \"data.json\"\n",
        )
        .unwrap();
        assert_eq!(config.price_places, 3);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("data.json")));
    }

    #[test]
    fn out_of_range_places_rejected() {
        let err = SportsDbConfig::from_toml_str("price_places = 12").unwrap_err();
        assert!(matches!(err, SportsError::InvalidInput { .. }));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(SportsDbConfig::from_toml_str("colour = \"red\"").is_err());
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sportsdb.toml");
        std::fs::write(&path, "price_places = 4\n").unwrap();
        assert_eq!(SportsDbConfig::from_file(&path).unwrap().price_places, 4);
        assert!(SportsDbConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
