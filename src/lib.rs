//! Property graph storage on a transactional key-value store.
//!
//! Vertices, labeled directed or undirected edges, and string properties are
//! mapped onto three tables of a store that offers only reads, writes,
//! atomic increments and optimistic multi-key transactions.
//!
//! ```
//! use kvgraph::primitives::kv::MemStore;
//! use kvgraph::storage::{Graph, GraphOptions, PropertyMap};
//! use kvgraph::types::{Directionality, EdgeDirection};
//!
//! let graph = Graph::open(MemStore::new(), GraphOptions::new("social"))?;
//! let mut session = graph.session()?;
//! let alice = graph.add_vertex(&mut session, "Person", &PropertyMap::new(), None)?;
//! let bob = graph.add_vertex(&mut session, "Person", &PropertyMap::new(), None)?;
//! graph.add_edge(&mut session, alice, bob, "knows", Directionality::Directed, &PropertyMap::new())?;
//! session.commit()?;
//!
//! let friends = graph.vertex_neighbors(&mut session, alice, &[EdgeDirection::Out], &["knows"])?;
//! assert_eq!(friends[0].id, bob);
//! # Ok::<(), kvgraph::types::GraphError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod logging;
pub mod primitives;
pub mod storage;
pub mod types;

pub use config::{ConfigError, GraphConfig};
pub use storage::{Graph, GraphOptions, Session};
pub use types::{GraphError, Result};
