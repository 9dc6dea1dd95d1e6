use std::collections::{BTreeMap, HashMap};

use auto_impl::auto_impl;
use cl_structure::{
    ConcentratedLiquidityPool, ConcentratedPool, PoolId, Position, PositionKey, Tick, TickInfo
};

/// Point reads and writes over pools, ticks and positions. Reads hand out
/// owned copies; nothing changes until the matching setter is called.
#[auto_impl(&mut, Box)]
pub trait LedgerStore {
    type Pool: ConcentratedPool + Clone;

    fn pool(&self, pool_id: PoolId) -> Option<Self::Pool>;
    fn set_pool(&mut self, pool: Self::Pool);

    fn tick(&self, pool_id: PoolId, tick: Tick) -> Option<TickInfo>;
    fn set_tick(&mut self, pool_id: PoolId, tick: Tick, info: TickInfo);
    /// Every stored tick of the pool in ascending order.
    fn ticks(&self, pool_id: PoolId) -> Vec<(Tick, TickInfo)>;

    fn position(&self, key: &PositionKey) -> Option<Position>;
    fn set_position(&mut self, position: Position);
    fn remove_position(&mut self, key: &PositionKey);
}

#[derive(Debug, Clone)]
pub struct MemoryStore<P = ConcentratedLiquidityPool> {
    pools:     HashMap<PoolId, P>,
    ticks:     BTreeMap<(PoolId, Tick), TickInfo>,
    positions: BTreeMap<PositionKey, Position>
}

impl<P> Default for MemoryStore<P> {
    fn default() -> Self {
        Self { pools: HashMap::new(), ticks: BTreeMap::new(), positions: BTreeMap::new() }
    }
}

impl<P: ConcentratedPool + Clone> MemoryStore<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(mut self, pool: P) -> Self {
        self.set_pool(pool);
        self
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.positions.values()
    }
}

impl<P: ConcentratedPool + Clone> LedgerStore for MemoryStore<P> {
    type Pool = P;

    fn pool(&self, pool_id: PoolId) -> Option<P> {
        self.pools.get(&pool_id).cloned()
    }

    fn set_pool(&mut self, pool: P) {
        self.pools.insert(pool.id(), pool);
    }

    fn tick(&self, pool_id: PoolId, tick: Tick) -> Option<TickInfo> {
        self.ticks.get(&(pool_id, tick)).cloned()
    }

    fn set_tick(&mut self, pool_id: PoolId, tick: Tick, info: TickInfo) {
        self.ticks.insert((pool_id, tick), info);
    }

    fn ticks(&self, pool_id: PoolId) -> Vec<(Tick, TickInfo)> {
        self.ticks
            .range((pool_id, Tick::MIN)..=(pool_id, Tick::MAX))
            .map(|((_, tick), info)| (*tick, info.clone()))
            .collect()
    }

    fn position(&self, key: &PositionKey) -> Option<Position> {
        self.positions.get(key).cloned()
    }

    fn set_position(&mut self, position: Position) {
        self.positions.insert(position.key, position);
    }

    fn remove_position(&mut self, key: &PositionKey) {
        self.positions.remove(key);
    }
}
