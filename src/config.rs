//! Configuration for sbsearch-rs
//!
//! Runtime settings for the database location, survey observation table, and
//! ephemeris provider. Loadable from a JSON file or built from defaults.

use crate::error::{Result, SbSearchError};
use crate::ephemeris::Source;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database, or `:memory:` for a transient store
    pub database: String,

    /// Name of the survey observation table; the observation R-tree and
    /// found-record tables derive their names from it
    pub obs_table: String,

    /// Observer location passed to the ephemeris provider (observatory code)
    pub location: String,

    /// Default ephemeris source when none is given on a request
    pub source: Source,

    /// Capacity of the provider response cache (number of raw responses)
    pub provider_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "sbsearch.db".to_string(),
            obs_table: "obs".to_string(),
            location: "500".to_string(),
            source: Source::Mpc,
            provider_cache_size: 64,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SbSearchError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|e| {
            SbSearchError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Configuration for an in-memory database (used by tests and one-off runs)
    pub fn memory() -> Self {
        Self {
            database: ":memory:".to_string(),
            ..Self::default()
        }
    }
}
