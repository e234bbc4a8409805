//! TOML configuration for embedding applications.
//!
//! ```toml
//! [graph]
//! graph_name = "social"
//! id_shards = 16
//! shard_policy = "round_robin"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::options::{
    check_layout, DEFAULT_GRAPH_NAME, DEFAULT_ID_SHARDS, DEFAULT_MAX_TX_RETRIES,
};
use crate::storage::ShardPolicy;
use crate::types::GraphError;

/// Settings of one graph instance, as read from the `[graph]` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Prefix of the table names.
    pub graph_name: String,
    /// Storage servers each table is spread across.
    pub server_span: u32,
    /// Number of id allocation shards.
    pub id_shards: u32,
    /// Shard selection policy.
    pub shard_policy: ShardPolicy,
    /// Conflict retries performed by `Graph::transact`.
    pub max_tx_retries: u32,
    /// Initial retry backoff in milliseconds.
    pub retry_backoff_ms: u64,
    /// Default tracing filter.
    pub log_level: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            graph_name: DEFAULT_GRAPH_NAME.to_owned(),
            server_span: 1,
            id_shards: DEFAULT_ID_SHARDS,
            shard_policy: ShardPolicy::Random,
            max_tx_retries: DEFAULT_MAX_TX_RETRIES,
            retry_backoff_ms: 1,
            log_level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    graph: GraphConfig,
}

impl GraphConfig {
    /// Parses a TOML document; absent keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(contents).map_err(|source| ConfigError::Parse { path: None, source })?;
        raw.graph.validate()?;
        Ok(raw.graph)
    }

    /// Reads and parses the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        raw.graph.validate()?;
        Ok(raw.graph)
    }

    /// Renders the config as a TOML document with a `[graph]` table.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let raw = RawConfig {
            graph: self.clone(),
        };
        toml::to_string_pretty(&raw).map_err(|source| ConfigError::Serialize { source })
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_layout(&self.graph_name, self.id_shards).map_err(ConfigError::Invalid)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The document is not valid TOML or has unknown keys.
    #[error("failed to parse config{}: {source}", display_path(.path))]
    Parse {
        /// File that failed, if parsing from a file.
        path: Option<PathBuf>,
        /// Underlying parse error.
        source: toml::de::Error,
    },
    /// The config could not be rendered.
    #[error("failed to serialize config: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: toml::ser::Error,
    },
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

impl From<ConfigError> for GraphError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Read { source, .. } => GraphError::Io(source),
            other => GraphError::Config(other.to_string()),
        }
    }
}
