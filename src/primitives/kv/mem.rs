use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{KvConnection, KvStore, KvTransaction, TableId};
use crate::primitives::bytes::ord;
use crate::types::{GraphError, Result};

/// In-process key-value store with per-key optimistic concurrency control.
///
/// Every object carries a store-wide version number. Transactions remember
/// the version of each key they read or write (absent keys are version 0)
/// and commit only if all of them are unchanged.
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    online: AtomicBool,
    connections: AtomicU64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            online: AtomicBool::new(true),
            connections: AtomicU64::new(0),
        }
    }
}

#[derive(Default)]
struct State {
    names: HashMap<String, TableId>,
    tables: HashMap<TableId, Table>,
    next_table: u64,
    next_version: u64,
}

#[derive(Default)]
struct Table {
    objects: BTreeMap<Vec<u8>, Object>,
}

struct Object {
    value: Vec<u8>,
    version: u64,
}

impl State {
    fn table(&self, id: TableId) -> Result<&Table> {
        self.tables
            .get(&id)
            .ok_or_else(|| GraphError::not_found("table", id))
    }

    fn table_mut(&mut self, id: TableId) -> Result<&mut Table> {
        self.tables
            .get_mut(&id)
            .ok_or_else(|| GraphError::not_found("table", id))
    }

    fn version_of(&self, id: TableId, key: &[u8]) -> Result<u64> {
        Ok(self.table(id)?.objects.get(key).map_or(0, |o| o.version))
    }

    fn bump(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    fn put(&mut self, id: TableId, key: &[u8], value: Vec<u8>) -> Result<()> {
        let version = self.bump();
        self.table_mut(id)?
            .objects
            .insert(key.to_vec(), Object { value, version });
        Ok(())
    }
}

impl Inner {
    fn check_online(&self) -> Result<()> {
        if self.online.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(GraphError::StorageUnavailable("store is offline".into()))
        }
    }
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) the store; while offline every call
    /// fails with `StorageUnavailable`.
    pub fn set_available(&self, online: bool) {
        self.inner.online.store(online, Ordering::Release);
    }

    /// Number of connections opened so far.
    pub fn connections_opened(&self) -> u64 {
        self.inner.connections.load(Ordering::Relaxed)
    }

    /// Number of objects stored in `name`, or `None` if the table does not exist.
    pub fn table_len(&self, name: &str) -> Option<usize> {
        let state = self.inner.state.lock();
        let id = state.names.get(name)?;
        state.tables.get(id).map(|t| t.objects.len())
    }
}

impl KvStore for MemStore {
    type Conn = MemConnection;

    fn connect(&self) -> Result<MemConnection> {
        self.inner.check_online()?;
        let id = self.inner.connections.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(conn = id, "kv.mem.connect");
        Ok(MemConnection {
            inner: Arc::clone(&self.inner),
            id,
        })
    }
}

/// A connection to a [`MemStore`].
pub struct MemConnection {
    inner: Arc<Inner>,
    id: u64,
}

impl MemConnection {
    /// Connection number, unique per store.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl KvConnection for MemConnection {
    type Tx = MemTransaction;

    fn create_table(&mut self, name: &str, server_span: u32) -> Result<TableId> {
        self.inner.check_online()?;
        let mut state = self.inner.state.lock();
        if let Some(id) = state.names.get(name) {
            return Ok(*id);
        }
        state.next_table += 1;
        let id = TableId(state.next_table);
        state.names.insert(name.to_owned(), id);
        state.tables.insert(id, Table::default());
        debug!(table = name, id = id.0, server_span, "kv.mem.create_table");
        Ok(id)
    }

    fn drop_table(&mut self, name: &str) -> Result<()> {
        self.inner.check_online()?;
        let mut state = self.inner.state.lock();
        if let Some(id) = state.names.remove(name) {
            state.tables.remove(&id);
            debug!(table = name, id = id.0, "kv.mem.drop_table");
        }
        Ok(())
    }

    fn read(&mut self, table: TableId, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.check_online()?;
        let state = self.inner.state.lock();
        Ok(state.table(table)?.objects.get(key).map(|o| o.value.clone()))
    }

    fn write(&mut self, table: TableId, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.check_online()?;
        self.inner.state.lock().put(table, key, value.to_vec())
    }

    fn increment_i64(&mut self, table: TableId, key: &[u8], delta: i64) -> Result<i64> {
        self.inner.check_online()?;
        let mut state = self.inner.state.lock();
        let current = match state.table(table)?.objects.get(key) {
            Some(obj) => ord::get_i64_le(&obj.value)?,
            None => 0,
        };
        let next = current.wrapping_add(delta);
        state.put(table, key, ord::i64_le(next).to_vec())?;
        Ok(next)
    }

    fn begin_transaction(&mut self) -> Result<MemTransaction> {
        self.inner.check_online()?;
        Ok(MemTransaction {
            inner: Arc::clone(&self.inner),
            conn: self.id,
            observed: HashMap::new(),
            writes: BTreeMap::new(),
        })
    }
}

type ObjectKey = (TableId, Vec<u8>);

/// Optimistic transaction on a [`MemStore`].
pub struct MemTransaction {
    inner: Arc<Inner>,
    conn: u64,
    observed: HashMap<ObjectKey, u64>,
    writes: BTreeMap<ObjectKey, Vec<u8>>,
}

impl MemTransaction {
    /// Number of buffered writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }
}

impl KvTransaction for MemTransaction {
    fn read(&mut self, table: TableId, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.check_online()?;
        let object_key = (table, key.to_vec());
        if let Some(value) = self.writes.get(&object_key) {
            return Ok(Some(value.clone()));
        }
        let state = self.inner.state.lock();
        let found = state.table(table)?.objects.get(key);
        let version = found.map_or(0, |o| o.version);
        let value = found.map(|o| o.value.clone());
        drop(state);
        self.observed.entry(object_key).or_insert(version);
        Ok(value)
    }

    fn write(&mut self, table: TableId, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.check_online()?;
        let object_key = (table, key.to_vec());
        if !self.observed.contains_key(&object_key) {
            let version = self.inner.state.lock().version_of(table, key)?;
            self.observed.insert(object_key.clone(), version);
        }
        self.writes.insert(object_key, value.to_vec());
        Ok(())
    }

    fn commit(self) -> Result<bool> {
        self.inner.check_online()?;
        let mut state = self.inner.state.lock();
        for ((table, key), seen) in &self.observed {
            let current = state.version_of(*table, key)?;
            if current != *seen {
                debug!(
                    conn = self.conn,
                    table = table.0,
                    key = %hex::encode(key),
                    seen,
                    current,
                    "kv.mem.commit.conflict"
                );
                return Ok(false);
            }
        }
        let writes = self.writes.len();
        for ((table, key), value) in self.writes {
            state.put(table, &key, value)?;
        }
        trace!(conn = self.conn, writes, "kv.mem.commit");
        Ok(true)
    }

    fn close(self) {
        trace!(conn = self.conn, discarded = self.writes.len(), "kv.mem.close");
    }
}
