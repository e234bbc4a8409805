//! Sharded counters issuing system-assigned vertex ids.
//!
//! Each shard owns one counter in the id table. Allocation picks a shard,
//! atomically increments its counter outside any transaction, and packs
//! `(shard, value)` into a [`VertexId`]. Values only grow, so ids are never
//! reused; nothing orders ids across shards.

use std::sync::atomic::{AtomicU32, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::primitives::bytes::ord;
use crate::primitives::kv::{KvConnection, TableId};
use crate::types::{GraphError, Result, VertexId};

use super::keys;

/// How allocation spreads counter increments across shards.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardPolicy {
    /// Uniformly random shard per allocation.
    #[default]
    Random,
    /// Shards in turn.
    RoundRobin,
}

/// One issued id.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Allocation {
    /// Shard whose counter was incremented.
    pub shard: u32,
    /// The counter's new value, starting at 1.
    pub counter: u64,
}

impl Allocation {
    /// The system-assigned vertex id for this allocation.
    pub fn vertex_id(self) -> VertexId {
        VertexId::from_parts(
            crate::types::SYSTEM_ID_BIT | u64::from(self.shard),
            self.counter,
        )
    }
}

/// Issues ids from `shards` independent counters.
#[derive(Debug)]
pub struct IdAllocator {
    table: TableId,
    shards: u32,
    policy: ShardPolicy,
    cursor: AtomicU32,
}

impl IdAllocator {
    /// Creates an allocator over the counters stored in `table`.
    pub fn new(table: TableId, shards: u32, policy: ShardPolicy) -> Result<Self> {
        if shards == 0 {
            return Err(GraphError::invalid("id allocator needs at least one shard"));
        }
        Ok(Self {
            table,
            shards,
            policy,
            cursor: AtomicU32::new(0),
        })
    }

    /// Number of shards.
    pub fn shards(&self) -> u32 {
        self.shards
    }

    /// Selection policy.
    pub fn policy(&self) -> ShardPolicy {
        self.policy
    }

    /// Picks the next shard according to the policy.
    pub fn pick_shard(&self) -> u32 {
        match self.policy {
            ShardPolicy::Random => self.pick_shard_with(&mut rand::thread_rng()),
            ShardPolicy::RoundRobin => self.cursor.fetch_add(1, Ordering::Relaxed) % self.shards,
        }
    }

    /// Picks a uniformly random shard from `rng`.
    pub fn pick_shard_with<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(0..self.shards)
    }

    /// Allocates an id on a policy-selected shard.
    pub fn allocate<C: KvConnection>(&self, conn: &mut C) -> Result<Allocation> {
        let shard = self.pick_shard();
        self.allocate_on(conn, shard)
    }

    /// Allocates an id on `shard`.
    pub fn allocate_on<C: KvConnection>(&self, conn: &mut C, shard: u32) -> Result<Allocation> {
        if shard >= self.shards {
            return Err(GraphError::invalid(format!(
                "shard {shard} out of range (have {})",
                self.shards
            )));
        }
        let value = conn.increment_i64(self.table, &keys::id_counter(shard), 1)?;
        let counter = u64::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or(GraphError::Corruption("id counter is not positive"))?;
        trace!(shard, counter, "graph.id_alloc.allocate");
        Ok(Allocation { shard, counter })
    }

    /// Highest counter value issued on `shard` so far (0 if none).
    ///
    /// Reads on the connection, outside any transaction.
    pub fn high_water<C: KvConnection>(&self, conn: &mut C, shard: u32) -> Result<u64> {
        match conn.read(self.table, &keys::id_counter(shard))? {
            Some(raw) => {
                let value = ord::get_i64_le(&raw)?;
                u64::try_from(value).map_err(|_| GraphError::Corruption("id counter is negative"))
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::kv::{KvStore, MemStore};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(shards: u32, policy: ShardPolicy) -> (MemStore, IdAllocator) {
        let store = MemStore::new();
        let mut conn = store.connect().unwrap();
        let table = conn.create_table("g_idTable", 1).unwrap();
        (store, IdAllocator::new(table, shards, policy).unwrap())
    }

    #[test]
    fn single_shard_counters_strictly_increase() {
        let (store, alloc) = setup(16, ShardPolicy::Random);
        let mut conn = store.connect().unwrap();
        let mut last = 0;
        for _ in 0..100 {
            let a = alloc.allocate_on(&mut conn, 3).unwrap();
            assert_eq!(a.shard, 3);
            assert!(a.counter > last);
            last = a.counter;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn ids_encode_shard_and_counter() {
        let (store, alloc) = setup(4, ShardPolicy::RoundRobin);
        let mut conn = store.connect().unwrap();
        let a = alloc.allocate_on(&mut conn, 2).unwrap();
        let id = a.vertex_id();
        assert!(id.is_system());
        assert_eq!(id.system_parts(), Some((2, 1)));
    }

    #[test]
    fn round_robin_visits_every_shard() {
        let (store, alloc) = setup(4, ShardPolicy::RoundRobin);
        let mut conn = store.connect().unwrap();
        let shards: Vec<u32> = (0..8)
            .map(|_| alloc.allocate(&mut conn).unwrap().shard)
            .collect();
        assert_eq!(shards, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn random_policy_stays_in_range() {
        let (_store, alloc) = setup(16, ShardPolicy::Random);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = [false; 16];
        for _ in 0..1000 {
            let shard = alloc.pick_shard_with(&mut rng);
            seen[shard as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "every shard should be picked");
    }

    #[test]
    fn out_of_range_shard_is_invalid() {
        let (store, alloc) = setup(2, ShardPolicy::Random);
        let mut conn = store.connect().unwrap();
        assert!(alloc.allocate_on(&mut conn, 2).is_err());
        assert!(IdAllocator::new(TableId(1), 0, ShardPolicy::Random).is_err());
    }

    #[test]
    fn high_water_tracks_latest_allocation() {
        let (store, alloc) = setup(2, ShardPolicy::Random);
        let mut conn = store.connect().unwrap();
        alloc.allocate_on(&mut conn, 1).unwrap();
        alloc.allocate_on(&mut conn, 1).unwrap();
        let mut other = store.connect().unwrap();
        assert_eq!(alloc.high_water(&mut other, 0).unwrap(), 0);
        assert_eq!(alloc.high_water(&mut other, 1).unwrap(), 2);
    }
}
