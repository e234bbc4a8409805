//! Graph storage layered over a transactional key-value store.
//!
//! Codecs translate vertices, edge lists and properties into table/key/value
//! triples; [`Graph`] orchestrates them inside a [`Session`]'s transaction.

/// Per-(vertex, label, direction) edge list encoding.
pub mod edge_list;
/// Key layout inside the vertex and id tables.
pub mod keys;
/// Per-vertex edge-label index encoding.
pub mod label_index;
/// Property map encoding.
pub mod props;

mod features;
mod graph;
mod id_alloc;
pub(crate) mod options;
mod session;
mod types;

/// Capability descriptor.
pub use features::{
    EdgeFeatures, Features, GraphFeatures, PropertyFeatures, VertexFeatures, FEATURES,
};

/// Graph orchestrator.
pub use graph::Graph;

/// Shard counters for system-assigned ids.
pub use id_alloc::{Allocation, IdAllocator, ShardPolicy};

/// Graph configuration options.
pub use options::{
    GraphOptions, DEFAULT_GRAPH_NAME, DEFAULT_ID_SHARDS, DEFAULT_MAX_TX_RETRIES, MAX_RETRY_BACKOFF,
};

/// Transaction binding.
pub use session::{Session, TxState};

/// Domain values.
pub use types::{
    Cardinality, Direction, ElementArg, NeighborHint, PropertyMap, Vertex, VertexProperty,
    DEFAULT_VERTEX_LABEL,
};
