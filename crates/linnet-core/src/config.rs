//! Configuration for the engine.
//!
//! Values are layered with figment: built-in defaults, then an optional
//! TOML file, then `LINNET_`-prefixed environment variables where nested
//! keys are separated by `__` (for example `LINNET_WRITE__BATCH_SIZE=10`).

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::{MAX_BATCH_GET, MAX_BATCH_WRITE};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LINNET_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinnetConfig {
    /// Table identity.
    pub store: StoreConfig,
    /// Read path limits.
    pub query: QueryConfig,
    /// Write path limits and retry policy.
    pub write: WriteConfig,
    /// Soft-delete policy.
    pub delete: DeleteConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Table identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name of the single table holding every row.
    pub table_name: String,
    /// Secondary index keyed on `linnet:edge`.
    pub edge_index_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: "linnet".to_string(),
            edge_index_name: "edge-dataType".to_string(),
        }
    }
}

/// Read path limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size for plural connections.
    pub default_limit: usize,
    /// Page size for singular connections.
    pub singular_limit: usize,
    /// Page size used when every page must be read.
    pub query_all_limit: usize,
    /// Keys per batch get.
    pub get_batch_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            singular_limit: 1,
            query_all_limit: 1000,
            get_batch_size: 25,
        }
    }
}

/// Write path limits and retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    /// Requests per batch write.
    pub batch_size: usize,
    /// Retries of unprocessed or throttled requests per chunk.
    pub max_retries: u32,
    /// First backoff delay.
    pub base_backoff_ms: u64,
    /// Backoff cap.
    pub max_backoff_ms: u64,
    /// Value of `createdBy` on new rows.
    pub created_by: String,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            max_retries: 5,
            base_backoff_ms: 50,
            max_backoff_ms: 2000,
            created_by: "linnet".to_string(),
        }
    }
}

/// Soft-delete policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteConfig {
    /// A supplied ttl older than now minus this window is clamped.
    pub grace_minutes: i64,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self { grace_minutes: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human readable output.
    #[default]
    Pretty,
    /// Single-line human readable output.
    Compact,
    /// Newline-delimited JSON.
    Json,
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LinnetConfig {
    /// Loads defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the store or the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.store.table_name.is_empty() {
            return Err(Error::Config("store.table_name must not be empty".into()));
        }
        if self.store.edge_index_name.is_empty() {
            return Err(Error::Config(
                "store.edge_index_name must not be empty".into(),
            ));
        }
        check_range("write.batch_size", self.write.batch_size, MAX_BATCH_WRITE)?;
        check_range("query.get_batch_size", self.query.get_batch_size, MAX_BATCH_GET)?;
        for (name, value) in [
            ("query.default_limit", self.query.default_limit),
            ("query.singular_limit", self.query.singular_limit),
            ("query.query_all_limit", self.query.query_all_limit),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be positive")));
            }
        }
        if self.write.base_backoff_ms > self.write.max_backoff_ms {
            return Err(Error::Config(
                "write.base_backoff_ms must not exceed write.max_backoff_ms".into(),
            ));
        }
        if self.delete.grace_minutes < 0 {
            return Err(Error::Config("delete.grace_minutes must not be negative".into()));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: usize, max: usize) -> Result<()> {
    if value == 0 || value > max {
        return Err(Error::Config(format!(
            "{name} must be between 1 and {max}, got {value}"
        )));
    }
    Ok(())
}
