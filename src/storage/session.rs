use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::primitives::kv::{KvConnection, KvStore, KvTransaction};
use crate::types::{GraphError, Result, VertexId};

use super::graph::Graph;

type TxOf<S> = <<S as KvStore>::Conn as KvConnection>::Tx;

/// Whether a session currently holds an underlying transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// No transaction; the next graph call opens one.
    Closed,
    /// Buffering reads and writes until commit or rollback.
    Open,
}

/// Binds a sequence of graph calls to one optimistic transaction.
///
/// Each session owns its own store connection, so sessions may run on
/// different threads. The transaction is opened lazily by the first graph
/// call and ends at [`Session::commit`] or [`Session::rollback`]; the session
/// is then reusable. Dropping a session with an open transaction rolls it
/// back.
pub struct Session<'g, S: KvStore> {
    graph: &'g Graph<S>,
    conn: S::Conn,
    tx: Option<TxOf<S>>,
    labels: HashMap<VertexId, String>,
    id: u64,
}

impl<'g, S: KvStore> Session<'g, S> {
    pub(crate) fn new(graph: &'g Graph<S>, conn: S::Conn, id: u64) -> Self {
        Self {
            graph,
            conn,
            tx: None,
            labels: HashMap::new(),
            id,
        }
    }

    /// Session number, unique per graph.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current transaction state.
    pub fn state(&self) -> TxState {
        if self.tx.is_some() {
            TxState::Open
        } else {
            TxState::Closed
        }
    }

    pub(crate) fn belongs_to(&self, graph: &Graph<S>) -> bool {
        std::ptr::eq(self.graph, graph)
    }

    /// The open transaction, beginning one if needed.
    pub(crate) fn tx(&mut self) -> Result<&mut TxOf<S>> {
        self.graph.ensure_open()?;
        if self.tx.is_none() {
            let tx = self.conn.begin_transaction()?;
            debug!(session = self.id, "graph.tx.begin");
            self.tx = Some(tx);
        }
        self.tx
            .as_mut()
            .ok_or_else(|| GraphError::StorageUnavailable("transaction was not opened".into()))
    }

    /// The session's connection, for non-transactional counter access.
    pub(crate) fn conn(&mut self) -> Result<&mut S::Conn> {
        self.graph.ensure_open()?;
        Ok(&mut self.conn)
    }

    pub(crate) fn cached_label(&self, id: VertexId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    pub(crate) fn cache_label(&mut self, id: VertexId, label: &str) {
        if !self.labels.contains_key(&id) {
            self.labels.insert(id, label.to_owned());
        }
    }

    /// Commits the open transaction, if any.
    ///
    /// A failed validation surfaces as [`GraphError::TransactionConflict`]
    /// and leaves the store unchanged. Conflicts are never retried here; see
    /// [`Graph::transact`].
    pub fn commit(&mut self) -> Result<()> {
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };
        if let Err(err) = self.graph.ensure_open() {
            tx.close();
            self.labels.clear();
            return Err(err);
        }
        match tx.commit() {
            Ok(true) => {
                debug!(session = self.id, "graph.tx.commit");
                Ok(())
            }
            Ok(false) => {
                self.labels.clear();
                debug!(session = self.id, "graph.tx.commit.conflict");
                Err(GraphError::TransactionConflict)
            }
            Err(err) => {
                self.labels.clear();
                warn!(session = self.id, error = %err, "graph.tx.commit.error");
                Err(err)
            }
        }
    }

    /// Discards the open transaction, if any.
    pub fn rollback(&mut self) {
        if let Some(tx) = self.tx.take() {
            tx.close();
            self.labels.clear();
            debug!(session = self.id, "graph.tx.rollback");
        }
    }
}

impl<S: KvStore> fmt::Debug for Session<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("cached_labels", &self.labels.len())
            .finish()
    }
}

impl<S: KvStore> Drop for Session<'_, S> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tx.close();
            debug!(session = self.id, "graph.tx.drop_rollback");
        }
    }
}
