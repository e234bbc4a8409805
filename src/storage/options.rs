use std::time::Duration;

use crate::config::GraphConfig;
use crate::types::{GraphError, Result};

use super::id_alloc::ShardPolicy;

/// Default table-name prefix.
pub const DEFAULT_GRAPH_NAME: &str = "graph";
/// Default number of id allocation shards.
pub const DEFAULT_ID_SHARDS: u32 = 16;
/// Default retry budget for [`super::Graph::transact`].
pub const DEFAULT_MAX_TX_RETRIES: u32 = 100;
/// Upper bound on the backoff between retries.
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_millis(64);

/// Largest shard count that keeps shard numbers below the system id bit.
pub(crate) const MAX_ID_SHARDS: u32 = 1 << 31;

/// Configuration options supplied when opening a [`super::Graph`].
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Prefix of the three table names.
    pub graph_name: String,
    /// Storage servers each table is spread across.
    pub server_span: u32,
    /// Number of id allocation shards.
    pub id_shards: u32,
    /// How allocations pick a shard.
    pub shard_policy: ShardPolicy,
    /// Retries [`super::Graph::transact`] performs after a conflict.
    pub max_tx_retries: u32,
    /// Backoff before the first retry; doubled per attempt. Capped at
    /// [`MAX_RETRY_BACKOFF`].
    pub retry_backoff: Duration,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self::new(DEFAULT_GRAPH_NAME)
    }
}

impl GraphOptions {
    /// Creates options with default settings for the graph named `graph_name`.
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            graph_name: graph_name.into(),
            server_span: 1,
            id_shards: DEFAULT_ID_SHARDS,
            shard_policy: ShardPolicy::Random,
            max_tx_retries: DEFAULT_MAX_TX_RETRIES,
            retry_backoff: Duration::from_millis(1),
        }
    }

    /// Sets the number of servers each table spans.
    pub fn server_span(mut self, span: u32) -> Self {
        self.server_span = span;
        self
    }

    /// Sets the number of id allocation shards.
    pub fn id_shards(mut self, shards: u32) -> Self {
        self.id_shards = shards;
        self
    }

    /// Sets the shard selection policy.
    pub fn shard_policy(mut self, policy: ShardPolicy) -> Self {
        self.shard_policy = policy;
        self
    }

    /// Sets the conflict retry budget.
    pub fn max_tx_retries(mut self, retries: u32) -> Self {
        self.max_tx_retries = retries;
        self
    }

    /// Sets the initial retry backoff.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Delay before the first retry, never above the backoff cap.
    pub(crate) fn first_backoff(&self) -> Duration {
        self.retry_backoff.min(MAX_RETRY_BACKOFF)
    }

    pub(crate) fn id_table_name(&self) -> String {
        format!("{}_idTable", self.graph_name)
    }

    pub(crate) fn vertex_table_name(&self) -> String {
        format!("{}_vertexTable", self.graph_name)
    }

    pub(crate) fn edge_table_name(&self) -> String {
        format!("{}_edgeTable", self.graph_name)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_layout(&self.graph_name, self.id_shards).map_err(GraphError::Config)
    }
}

pub(crate) fn check_layout(graph_name: &str, id_shards: u32) -> std::result::Result<(), String> {
    if graph_name.is_empty() {
        return Err("graph_name must not be empty".into());
    }
    if id_shards == 0 || id_shards > MAX_ID_SHARDS {
        return Err(format!(
            "id_shards must be between 1 and {MAX_ID_SHARDS}, got {id_shards}"
        ));
    }
    Ok(())
}

impl From<&GraphConfig> for GraphOptions {
    fn from(cfg: &GraphConfig) -> Self {
        GraphOptions::new(cfg.graph_name.clone())
            .server_span(cfg.server_span)
            .id_shards(cfg.id_shards)
            .shard_policy(cfg.shard_policy)
            .max_tx_retries(cfg.max_tx_retries)
            .retry_backoff(Duration::from_millis(cfg.retry_backoff_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_use_the_graph_prefix() {
        let opts = GraphOptions::new("social");
        assert_eq!(opts.id_table_name(), "social_idTable");
        assert_eq!(opts.vertex_table_name(), "social_vertexTable");
        assert_eq!(opts.edge_table_name(), "social_edgeTable");
    }

    #[test]
    fn validate_rejects_bad_layouts() {
        assert!(GraphOptions::default().validate().is_ok());
        assert!(GraphOptions::new("").validate().is_err());
        assert!(GraphOptions::default().id_shards(0).validate().is_err());
        assert!(GraphOptions::default()
            .id_shards(MAX_ID_SHARDS + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn first_backoff_is_capped() {
        let opts = GraphOptions::default().retry_backoff(Duration::from_secs(1));
        assert_eq!(opts.first_backoff(), MAX_RETRY_BACKOFF);
        let opts = GraphOptions::default().retry_backoff(Duration::from_millis(3));
        assert_eq!(opts.first_backoff(), Duration::from_millis(3));
    }
}
