//! The narrow key-value interface the graph store is layered on.
//!
//! A [`KvStore`] hands out [`KvConnection`]s; each connection performs
//! table-scoped reads, writes and atomic increments and opens optimistic
//! [`KvTransaction`]s. Isolation and conflict detection belong entirely to
//! the implementation. Connections are not shared between threads; every
//! graph session opens its own.

use crate::types::Result;

mod mem;

pub use mem::{MemConnection, MemStore, MemTransaction};

/// Handle of a table created through [`KvConnection::create_table`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TableId(pub u64);

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A key-value cluster.
pub trait KvStore: Send + Sync {
    /// Connection type handed to each session.
    type Conn: KvConnection;

    /// Opens a new, independent connection.
    fn connect(&self) -> Result<Self::Conn>;
}

/// One client connection. Operations outside a transaction apply immediately.
pub trait KvConnection: Send {
    /// Transaction type opened on this connection.
    type Tx: KvTransaction;

    /// Creates `name` if absent and returns its id. `server_span` is a placement hint.
    fn create_table(&mut self, name: &str, server_span: u32) -> Result<TableId>;

    /// Drops `name` and everything stored in it. Dropping a missing table is a no-op.
    fn drop_table(&mut self, name: &str) -> Result<()>;

    /// Reads one object; `Ok(None)` when absent.
    fn read(&mut self, table: TableId, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Writes one object.
    fn write(&mut self, table: TableId, key: &[u8], value: &[u8]) -> Result<()>;

    /// Atomically adds `delta` to a 64-bit counter, creating it at zero if
    /// absent, and returns the new value.
    fn increment_i64(&mut self, table: TableId, key: &[u8], delta: i64) -> Result<i64>;

    /// Starts an optimistic multi-key transaction.
    fn begin_transaction(&mut self) -> Result<Self::Tx>;
}

/// Buffered optimistic transaction.
///
/// Reads observe the transaction's own buffered writes. Nothing is visible to
/// other transactions until [`KvTransaction::commit`] succeeds.
pub trait KvTransaction: Send {
    /// Reads one object through the write buffer.
    fn read(&mut self, table: TableId, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Buffers a write.
    fn write(&mut self, table: TableId, key: &[u8], value: &[u8]) -> Result<()>;

    /// Validates and applies the buffered writes atomically.
    ///
    /// Returns `Ok(false)` when validation failed; the store is then unchanged.
    fn commit(self) -> Result<bool>;

    /// Discards the buffered writes.
    fn close(self);
}
