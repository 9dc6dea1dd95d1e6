//! Write overlay over a [`LedgerStore`]. Operations run against a
//! [`CacheStore`]; their writes reach the parent only through
//! [`StagedWrites::commit`], so a failed operation leaves no trace.

use std::collections::{BTreeMap, HashMap};

use cl_structure::{ConcentratedPool, PoolId, Position, PositionKey, Tick, TickInfo};

use crate::store::LedgerStore;

pub struct CacheStore<'a, S: LedgerStore> {
    parent: &'a S,
    writes: StagedWrites<S::Pool>
}

impl<'a, S: LedgerStore> CacheStore<'a, S> {
    pub fn new(parent: &'a S) -> Self {
        Self { parent, writes: StagedWrites::default() }
    }

    pub fn into_writes(self) -> StagedWrites<S::Pool> {
        self.writes
    }
}

impl<S: LedgerStore> LedgerStore for CacheStore<'_, S> {
    type Pool = S::Pool;

    fn pool(&self, pool_id: PoolId) -> Option<Self::Pool> {
        match self.writes.pools.get(&pool_id) {
            Some(pool) => Some(pool.clone()),
            None => self.parent.pool(pool_id)
        }
    }

    fn set_pool(&mut self, pool: Self::Pool) {
        self.writes.pools.insert(pool.id(), pool);
    }

    fn tick(&self, pool_id: PoolId, tick: Tick) -> Option<TickInfo> {
        match self.writes.ticks.get(&(pool_id, tick)) {
            Some(info) => Some(info.clone()),
            None => self.parent.tick(pool_id, tick)
        }
    }

    fn set_tick(&mut self, pool_id: PoolId, tick: Tick, info: TickInfo) {
        self.writes.ticks.insert((pool_id, tick), info);
    }

    fn ticks(&self, pool_id: PoolId) -> Vec<(Tick, TickInfo)> {
        let mut merged = self
            .parent
            .ticks(pool_id)
            .into_iter()
            .collect::<BTreeMap<_, _>>();
        merged.extend(
            self.writes
                .ticks
                .range((pool_id, Tick::MIN)..=(pool_id, Tick::MAX))
                .map(|((_, tick), info)| (*tick, info.clone()))
        );

        merged.into_iter().collect()
    }

    fn position(&self, key: &PositionKey) -> Option<Position> {
        match self.writes.positions.get(key) {
            Some(staged) => staged.clone(),
            None => self.parent.position(key)
        }
    }

    fn set_position(&mut self, position: Position) {
        self.writes.positions.insert(position.key, Some(position));
    }

    fn remove_position(&mut self, key: &PositionKey) {
        self.writes.positions.insert(*key, None);
    }
}

/// Writes collected by a [`CacheStore`]. A `None` position is a deletion.
#[derive(Debug, Clone)]
pub struct StagedWrites<P> {
    pools:     HashMap<PoolId, P>,
    ticks:     BTreeMap<(PoolId, Tick), TickInfo>,
    positions: BTreeMap<PositionKey, Option<Position>>
}

impl<P> Default for StagedWrites<P> {
    fn default() -> Self {
        Self { pools: HashMap::new(), ticks: BTreeMap::new(), positions: BTreeMap::new() }
    }
}

impl<P> StagedWrites<P> {
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty() && self.ticks.is_empty() && self.positions.is_empty()
    }

    pub fn commit<S: LedgerStore<Pool = P>>(self, store: &mut S) {
        if self.is_empty() {
            return
        }
        tracing::trace!(
            "committing {} pools, {} ticks, {} positions",
            self.pools.len(),
            self.ticks.len(),
            self.positions.len()
        );

        for (_, pool) in self.pools {
            store.set_pool(pool);
        }
        for ((pool_id, tick), info) in self.ticks {
            store.set_tick(pool_id, tick, info);
        }
        for (key, position) in self.positions {
            match position {
                Some(position) => store.set_position(position),
                None => store.remove_position(&key)
            }
        }
    }
}
