use std::{collections::BTreeSet, net::SocketAddr, sync::Arc};

use alloy_primitives::Address;
use cl_structure::{
    Amount, Coin, ConcentratedPool, Dec, IncentiveId, PoolId, Position, PositionKey, Tick, TickInfo,
    Timestamp
};

use crate::{
    bank::{Bank, MemoryBank},
    cache::CacheStore,
    clock::{Clock, ManualClock},
    config::LedgerConfig,
    error::LedgerError,
    metrics::{Metrics, UNKNOWN_SOURCE, source_of},
    position_manager::{self, CreatedPosition},
    store::{LedgerStore, MemoryStore},
    tick_cross, tick_ledger
};

/// Entry point for the ledger. Every mutating call either applies all of its
/// writes and token transfers or none of them.
#[derive(Debug)]
pub struct Keeper<S = MemoryStore, B = MemoryBank, C = ManualClock> {
    store:          S,
    bank:           B,
    clock:          C,
    config:         LedgerConfig,
    metrics:        Option<Arc<Metrics>>,
    metrics_source: String
}

impl<S: LedgerStore, B: Bank, C: Clock> Keeper<S, B, C> {
    pub fn new(store: S, bank: B, clock: C, config: LedgerConfig) -> Self {
        let metrics = config.metrics_enabled.then(Metrics::global);
        Self { store, bank, clock, config, metrics, metrics_source: UNKNOWN_SOURCE.to_string() }
    }

    /// Records into `metrics` instead of the process-wide instance.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = self.config.metrics_enabled.then_some(metrics);
        self
    }

    pub fn with_metrics_source(mut self, peer: Option<&SocketAddr>) -> Self {
        self.metrics_source = source_of(peer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct access for collaborators that own pool state, such as the
    /// swap engine moving the current tick.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn record(&self, name: &str, value: f64) {
        if let Some(metrics) = &self.metrics {
            metrics.record_value(&self.metrics_source, name, value);
        }
    }

    fn staged<T>(
        &mut self,
        op: impl FnOnce(&mut CacheStore<'_, S>, Timestamp, &LedgerConfig) -> Result<T, LedgerError>
    ) -> Result<T, LedgerError> {
        let now = self.clock.block_time();
        let mut cache = CacheStore::new(&self.store);
        let out = op(&mut cache, now, &self.config)?;
        cache.into_writes().commit(&mut self.store);

        Ok(out)
    }

    pub fn pool(&self, pool_id: PoolId) -> Result<S::Pool, LedgerError> {
        tick_ledger::require_pool(&self.store, pool_id)
    }

    pub fn tick_info(&self, pool_id: PoolId, tick: Tick) -> Result<TickInfo, LedgerError> {
        tick_ledger::tick_info(&self.store, pool_id, tick)
    }

    pub fn set_tick_info(&mut self, pool_id: PoolId, tick: Tick, info: TickInfo) {
        tick_ledger::set_tick_info(&mut self.store, pool_id, tick, info);
    }

    pub fn initialized_ticks(&self, pool_id: PoolId) -> Result<Vec<(Tick, TickInfo)>, LedgerError> {
        tick_ledger::initialized_ticks(&self.store, pool_id)
    }

    pub fn net_liquidity_sum(&self, pool_id: PoolId) -> Result<Dec, LedgerError> {
        tick_ledger::net_liquidity_sum(&self.store, pool_id)
    }

    pub fn init_or_update_tick(
        &mut self,
        pool_id: PoolId,
        tick: Tick,
        liquidity_delta: Dec,
        upper: bool,
        incentive_ids: &[IncentiveId]
    ) -> Result<(), LedgerError> {
        let ids = incentive_ids.iter().copied().collect::<BTreeSet<_>>();
        self.staged(|store, now, _| {
            tick_ledger::init_or_update_tick(store, now, pool_id, tick, liquidity_delta, upper, &ids)
        })
    }

    pub fn cross_tick(&mut self, pool_id: PoolId, tick: Tick) -> Result<Dec, LedgerError> {
        let liquidity_net = self.staged(|store, now, config| {
            tick_cross::cross_tick(store, now, config.seconds_inactive_mode, pool_id, tick)
        })?;
        self.record("cross_tick", 1.0);

        Ok(liquidity_net)
    }

    pub fn seconds_per_liquidity_inside(
        &self,
        pool_id: PoolId,
        lower_tick: Tick,
        upper_tick: Tick,
        incentive_id: IncentiveId
    ) -> Result<Dec, LedgerError> {
        tick_cross::seconds_per_liquidity_inside(
            &self.store,
            &self.config,
            pool_id,
            lower_tick,
            upper_tick,
            incentive_id
        )
    }

    pub fn add_pool_incentive(&mut self, pool_id: PoolId, incentive_id: IncentiveId) -> Result<(), LedgerError> {
        self.staged(|store, _, _| tick_cross::add_pool_incentive(store, pool_id, incentive_id))
    }

    pub fn position(&self, key: &PositionKey) -> Result<Position, LedgerError> {
        self.store.position(key).ok_or(LedgerError::PositionNotFound {
            pool_id:    key.pool_id,
            lower_tick: key.lower_tick,
            upper_tick: key.upper_tick
        })
    }

    /// Deposits up to the desired amounts into `[lower_tick, upper_tick)` and
    /// moves the used amounts from `owner` to the pool.
    #[allow(clippy::too_many_arguments)]
    pub fn create_position(
        &mut self,
        pool_id: PoolId,
        owner: Address,
        amount0_desired: Amount,
        amount1_desired: Amount,
        amount0_min: Amount,
        amount1_min: Amount,
        lower_tick: Tick,
        upper_tick: Tick,
        incentive_ids: &[IncentiveId]
    ) -> Result<CreatedPosition, LedgerError> {
        tracing::debug!(
            "create position on pool {} [{}, {}) for {:?}, desired {}/{}",
            pool_id,
            lower_tick,
            upper_tick,
            owner,
            amount0_desired,
            amount1_desired
        );

        let now = self.clock.block_time();
        let ids = incentive_ids.iter().copied().collect::<BTreeSet<_>>();
        let mut cache = CacheStore::new(&self.store);

        let created = position_manager::create_position(
            &mut cache,
            now,
            &self.config,
            pool_id,
            owner,
            amount0_desired,
            amount1_desired,
            amount0_min,
            amount1_min,
            lower_tick,
            upper_tick,
            &ids
        )?;

        let pool = tick_ledger::require_pool(&cache, pool_id)?;
        let coins = pool_coins(&pool, created.amount0, created.amount1);
        self.bank.send_coins(owner, pool.address(), &coins)?;
        cache.into_writes().commit(&mut self.store);

        self.record("create_position", 1.0);
        self.record("liquidity_added", created.liquidity.to_f64());
        Ok(created)
    }

    /// Removes `liquidity` from the position and pays the released amounts
    /// out of the pool to `owner`.
    pub fn withdraw_position(
        &mut self,
        pool_id: PoolId,
        owner: Address,
        lower_tick: Tick,
        upper_tick: Tick,
        liquidity: Dec,
        incentive_ids: &[IncentiveId]
    ) -> Result<(Amount, Amount), LedgerError> {
        tracing::debug!(
            "withdraw {} liquidity from pool {} [{}, {}) for {:?}",
            liquidity,
            pool_id,
            lower_tick,
            upper_tick,
            owner
        );

        let now = self.clock.block_time();
        let ids = incentive_ids.iter().copied().collect::<BTreeSet<_>>();
        let mut cache = CacheStore::new(&self.store);

        let (amount0, amount1) = position_manager::withdraw_position(
            &mut cache,
            now,
            &self.config,
            pool_id,
            owner,
            lower_tick,
            upper_tick,
            liquidity,
            &ids
        )?;

        let pool = tick_ledger::require_pool(&cache, pool_id)?;
        let coins = pool_coins(&pool, amount0, amount1);
        self.bank.send_coins(pool.address(), owner, &coins)?;
        cache.into_writes().commit(&mut self.store);

        self.record("withdraw_position", 1.0);
        self.record("liquidity_removed", liquidity.to_f64());
        Ok((amount0, amount1))
    }
}

fn pool_coins<P: ConcentratedPool>(pool: &P, amount0: Amount, amount1: Amount) -> Vec<Coin> {
    [Coin::new(pool.token0(), amount0), Coin::new(pool.token1(), amount1)]
        .into_iter()
        .filter(|coin| coin.amount > 0)
        .collect()
}
