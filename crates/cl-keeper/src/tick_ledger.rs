//! Per-tick liquidity state. A tick that was never touched reads as zero.

use std::collections::BTreeSet;

use cl_structure::{ConcentratedPool, Dec, IncentiveId, PoolId, Tick, TickInfo, Timestamp};

use crate::{error::LedgerError, store::LedgerStore};

pub(crate) fn require_pool<S: LedgerStore>(store: &S, pool_id: PoolId) -> Result<S::Pool, LedgerError> {
    store.pool(pool_id).ok_or(LedgerError::PoolNotFound { pool_id })
}

pub fn tick_info<S: LedgerStore>(store: &S, pool_id: PoolId, tick: Tick) -> Result<TickInfo, LedgerError> {
    require_pool(store, pool_id)?;
    Ok(store.tick(pool_id, tick).unwrap_or_default())
}

pub fn set_tick_info<S: LedgerStore>(store: &mut S, pool_id: PoolId, tick: Tick, info: TickInfo) {
    store.set_tick(pool_id, tick, info);
}

pub fn initialized_ticks<S: LedgerStore>(
    store: &S,
    pool_id: PoolId
) -> Result<Vec<(Tick, TickInfo)>, LedgerError> {
    require_pool(store, pool_id)?;
    Ok(store.ticks(pool_id))
}

/// Sum of `liquidity_net` over every stored tick. Zero for a consistent pool.
pub fn net_liquidity_sum<S: LedgerStore>(store: &S, pool_id: PoolId) -> Result<Dec, LedgerError> {
    let sum = initialized_ticks(store, pool_id)?
        .into_iter()
        .try_fold(Dec::ZERO, |acc, (_, info)| acc.checked_add(info.liquidity_net))?;
    Ok(sum)
}

/// Adds `liquidity_delta` to one boundary of a range, and to the records of
/// every incentive the position is committed to.
pub fn init_or_update_tick<S: LedgerStore>(
    store: &mut S,
    now: Timestamp,
    pool_id: PoolId,
    tick: Tick,
    liquidity_delta: Dec,
    upper: bool,
    incentive_ids: &BTreeSet<IncentiveId>
) -> Result<(), LedgerError> {
    let pool = require_pool(store, pool_id)?;
    let mut info = store.tick(pool_id, tick).unwrap_or_default();

    if info.is_inactive() {
        info.seconds_inactive = now.saturating_duration_since(pool.time_of_creation());
    }
    info.update_liquidity(liquidity_delta, upper)?;

    info.reconcile_incentives(pool.incentives().keys().copied());
    for incentive_id in incentive_ids {
        let record = info
            .incentive_records
            .get_mut(incentive_id)
            .ok_or(LedgerError::IncentiveNotFound { pool_id, incentive_id: *incentive_id })?;
        record.update_liquidity(liquidity_delta, upper)?;
    }

    tracing::trace!(
        "pool {} tick {} (upper: {}) gross={} net={}",
        pool_id,
        tick,
        upper,
        info.liquidity_gross,
        info.liquidity_net
    );
    store.set_tick(pool_id, tick, info);

    Ok(())
}
