use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use tracing::{debug, info, warn};

use crate::primitives::kv::{KvConnection, KvStore, KvTransaction, TableId};
use crate::types::{GraphError, Result, VertexId};

use super::features::{Features, FEATURES};
use super::id_alloc::IdAllocator;
use super::keys;
use super::options::{GraphOptions, MAX_RETRY_BACKOFF};
use super::session::Session;

mod edge_ops;
mod prop_ops;
mod vertex_ops;

/// A property graph stored in three tables of a key-value store.
///
/// All vertex data, including every edge list, lives in the vertex table
/// under keys prefixed by the vertex id. The id table holds one counter per
/// allocation shard. The edge table is created alongside them and left
/// empty.
///
/// Every read and write goes through a [`Session`]; operations take the
/// session explicitly and run inside its transaction.
pub struct Graph<S: KvStore> {
    store: S,
    options: GraphOptions,
    id_table: TableId,
    vertex_table: TableId,
    edge_table: TableId,
    ids: IdAllocator,
    closed: AtomicBool,
    next_session: AtomicU64,
}

impl<S: KvStore> Graph<S> {
    /// Opens the graph named by `options`, creating its tables if needed.
    pub fn open(store: S, options: GraphOptions) -> Result<Self> {
        options.validate()?;
        let mut conn = store.connect()?;
        let id_table = conn.create_table(&options.id_table_name(), options.server_span)?;
        let vertex_table = conn.create_table(&options.vertex_table_name(), options.server_span)?;
        let edge_table = conn.create_table(&options.edge_table_name(), options.server_span)?;
        let ids = IdAllocator::new(id_table, options.id_shards, options.shard_policy)?;
        info!(
            graph = %options.graph_name,
            id_shards = options.id_shards,
            policy = ?options.shard_policy,
            "graph.open"
        );
        Ok(Self {
            store,
            options,
            id_table,
            vertex_table,
            edge_table,
            ids,
            closed: AtomicBool::new(false),
            next_session: AtomicU64::new(0),
        })
    }

    /// Options the graph was opened with.
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Table holding the shard counters.
    pub fn id_table(&self) -> TableId {
        self.id_table
    }

    /// Table holding vertex records and edge lists.
    pub fn vertex_table(&self) -> TableId {
        self.vertex_table
    }

    /// Table reserved for edges; never written.
    pub fn edge_table(&self) -> TableId {
        self.edge_table
    }

    /// Static capability descriptor.
    pub fn features(&self) -> &'static Features {
        &FEATURES
    }

    /// Opens a session on a fresh store connection.
    pub fn session(&self) -> Result<Session<'_, S>> {
        self.ensure_open()?;
        let conn = self.store.connect()?;
        let id = self.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(session = id, "graph.session.open");
        Ok(Session::new(self, conn, id))
    }

    /// Runs `f` in a fresh session and commits, retrying on conflict.
    ///
    /// Conflicts are retried up to `max_tx_retries` times with exponential
    /// backoff capped at 64 ms. Any other error aborts at once. `f` must be
    /// safe to re-run.
    pub fn transact<T, F>(&self, mut f: F) -> Result<T>
    where
        F: FnMut(&mut Session<'_, S>) -> Result<T>,
    {
        let mut backoff = self.options.first_backoff();
        let mut attempt = 0u32;
        loop {
            let mut session = self.session()?;
            let outcome = match f(&mut session) {
                Ok(value) => session.commit().map(|()| value),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.options.max_tx_retries => {
                    attempt += 1;
                    warn!(attempt, backoff_ms = backoff.as_millis() as u64, "graph.tx.retry");
                    drop(session);
                    thread::sleep(backoff);
                    backoff = (backoff * 2).min(MAX_RETRY_BACKOFF);
                }
                Err(err) => {
                    if err.is_conflict() {
                        warn!(attempts = attempt + 1, "graph.tx.retry.exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Marks the graph closed. Later calls fail with
    /// [`GraphError::StorageUnavailable`]; open sessions can only roll back.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(graph = %self.options.graph_name, "graph.close");
        }
    }

    /// Whether [`Graph::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Drops the graph's three tables and everything in them.
    pub fn drop_graph(self) -> Result<()> {
        let mut conn = self.store.connect()?;
        for name in [
            self.options.id_table_name(),
            self.options.vertex_table_name(),
            self.options.edge_table_name(),
        ] {
            conn.drop_table(&name)?;
        }
        self.closed.store(true, Ordering::Release);
        info!(graph = %self.options.graph_name, "graph.drop");
        Ok(())
    }

    /// Graph computers are not supported.
    pub fn compute(&self) -> Result<()> {
        Err(GraphError::Unsupported("graph computer"))
    }

    /// Graph variables are not supported.
    pub fn variables(&self) -> Result<()> {
        Err(GraphError::Unsupported("graph variables"))
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(GraphError::StorageUnavailable(format!(
                "graph {} is closed",
                self.options.graph_name
            )));
        }
        Ok(())
    }

    fn check_session(&self, session: &Session<'_, S>) -> Result<()> {
        if !session.belongs_to(self) {
            return Err(GraphError::invalid("session belongs to a different graph"));
        }
        Ok(())
    }

    /// Reads a vertex label inside the session's transaction.
    fn read_label(&self, session: &mut Session<'_, S>, id: VertexId) -> Result<Option<String>> {
        let raw = session.tx()?.read(self.vertex_table, &keys::vertex_label(id))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let label =
            String::from_utf8(raw).map_err(|_| GraphError::Corruption("vertex label is not UTF-8"))?;
        session.cache_label(id, &label);
        Ok(Some(label))
    }

    fn require_label(&self, session: &mut Session<'_, S>, id: VertexId) -> Result<String> {
        self.read_label(session, id)?
            .ok_or_else(|| GraphError::not_found("vertex", id))
    }
}

impl<S: KvStore> std::fmt::Debug for Graph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("options", &self.options)
            .field("id_table", &self.id_table)
            .field("vertex_table", &self.vertex_table)
            .field("edge_table", &self.edge_table)
            .field("closed", &self.is_closed())
            .finish()
    }
}
