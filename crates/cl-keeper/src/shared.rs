use std::sync::{Arc, Mutex, PoisonError};

use cl_structure::PoolId;
use dashmap::DashMap;

use crate::{bank::SharedBank, clock::ManualClock, error::LedgerError, keeper::Keeper, store::MemoryStore};

/// One [`Keeper`] per pool, each behind its own lock. Calls on the same pool
/// run one at a time; calls on different pools do not wait on each other.
pub struct SharedLedger<S = MemoryStore, B = SharedBank, C = ManualClock> {
    keepers: DashMap<PoolId, Arc<Mutex<Keeper<S, B, C>>>>
}

impl<S, B, C> Default for SharedLedger<S, B, C> {
    fn default() -> Self {
        Self { keepers: DashMap::new() }
    }
}

impl<S, B, C> SharedLedger<S, B, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hosts `keeper` for `pool_id`, returning the keeper it replaces.
    pub fn insert(&self, pool_id: PoolId, keeper: Keeper<S, B, C>) -> Option<Arc<Mutex<Keeper<S, B, C>>>> {
        self.keepers.insert(pool_id, Arc::new(Mutex::new(keeper)))
    }

    pub fn pool_ids(&self) -> Vec<PoolId> {
        let mut ids = self.keepers.iter().map(|entry| *entry.key()).collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    /// Runs `op` with exclusive access to the pool's keeper.
    pub fn with_pool<T>(
        &self,
        pool_id: PoolId,
        op: impl FnOnce(&mut Keeper<S, B, C>) -> Result<T, LedgerError>
    ) -> Result<T, LedgerError> {
        // release the map shard before blocking on the pool lock
        let keeper = self
            .keepers
            .get(&pool_id)
            .map(|entry| entry.value().clone())
            .ok_or(LedgerError::PoolNotFound { pool_id })?;

        let mut guard = keeper.lock().unwrap_or_else(PoisonError::into_inner);
        op(&mut guard)
    }
}
