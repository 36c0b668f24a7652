//! Configuration for the fee dashboard
//!
//! All external-service wiring lives in config.toml and is passed into
//! provider constructors explicitly; nothing is held in process-wide state.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    pub api_keys: ApiKeys,
    pub store: StoreConfig,
    pub queries: QueryIds,
}

/// API keys section
#[derive(Debug, Deserialize)]
pub struct ApiKeys {
    pub dune: String,
}

/// Object-store gateway settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Gateway base URL, e.g. "https://storage.example.com"
    pub base_url: String,
    /// Bucket holding the metric exports
    pub bucket: String,
    /// Object key for the monthly gas-fee export
    pub fee_object: String,
    /// Object key for the daily throughput export
    pub throughput_object: String,
}

/// Saved Dune query ids, one per metric table
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QueryIds {
    pub tx_fees: u64,
    pub throughput: u64,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Missing required fields (api_keys.dune, store.bucket, etc.)\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\n\
             See config.toml.example for the expected format."
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Validated runtime configuration
#[derive(Debug)]
pub struct Config {
    pub dune_api_key: String,
    pub store: StoreConfig,
    pub queries: QueryIds,
}

impl Config {
    pub fn from_file(file: FileConfig) -> Result<Self> {
        if file.api_keys.dune.is_empty() {
            anyhow::bail!("api_keys.dune must not be empty");
        }
        if file.store.base_url.is_empty() || file.store.bucket.is_empty() {
            anyhow::bail!("store.base_url and store.bucket must not be empty");
        }

        Ok(Self {
            dune_api_key: file.api_keys.dune,
            store: file.store,
            queries: file.queries,
        })
    }
}
