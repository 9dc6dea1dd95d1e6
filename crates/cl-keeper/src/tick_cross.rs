use cl_structure::{ConcentratedPool, Dec, IncentiveId, PoolId, Tick, Timestamp};

use crate::{
    config::{LedgerConfig, SecondsInactiveMode},
    error::LedgerError,
    position_manager::validate_tick_range,
    store::LedgerStore,
    tick_ledger::{require_pool, tick_info}
};

/// Refreshes the time-weighted accounting of `tick` as the price moves across
/// it and returns the tick's net liquidity for the caller to apply.
pub fn cross_tick<S: LedgerStore>(
    store: &mut S,
    now: Timestamp,
    mode: SecondsInactiveMode,
    pool_id: PoolId,
    tick: Tick
) -> Result<Dec, LedgerError> {
    let mut pool = require_pool(store, pool_id)?;
    let mut info = tick_info(store, pool_id, tick)?;

    let pool_age = now.saturating_duration_since(pool.time_of_creation());
    info.seconds_inactive = match mode {
        SecondsInactiveMode::PoolAge => pool_age,
        SecondsInactiveMode::SinceLastCross => pool_age.saturating_sub(info.seconds_inactive)
    };
    let seconds_inactive = Dec::from_duration(info.seconds_inactive);

    let mut contributions = Vec::with_capacity(info.incentive_records.len());
    for (incentive_id, record) in info.incentive_records.iter_mut() {
        if record.liquidity_gross.is_zero() {
            tracing::warn!(
                "pool {} tick {} incentive {} has no liquidity, carrying {} forward",
                pool_id,
                tick,
                incentive_id,
                record.seconds_per_liquidity_outside
            );
            continue
        }

        record.seconds_per_liquidity_outside = seconds_inactive.checked_quo(record.liquidity_gross)?;
        contributions.push((*incentive_id, record.seconds_per_liquidity_outside));
    }

    let liquidity_net = info.liquidity_net;
    store.set_tick(pool_id, tick, info);

    for (incentive_id, value) in contributions {
        let Some(accumulator) = pool.incentives_mut().get_mut(&incentive_id) else {
            tracing::warn!("pool {} has no accumulator for incentive {}", pool_id, incentive_id);
            continue
        };
        accumulator.seconds_per_liquidity_global = accumulator.seconds_per_liquidity_global.checked_add(value)?;
    }
    store.set_pool(pool);

    tracing::debug!("crossed tick {} on pool {}, net liquidity {}", tick, pool_id, liquidity_net);
    Ok(liquidity_net)
}

/// Seconds per unit of liquidity accrued inside `[lower_tick, upper_tick)`
/// for one incentive.
pub fn seconds_per_liquidity_inside<S: LedgerStore>(
    store: &S,
    config: &LedgerConfig,
    pool_id: PoolId,
    lower_tick: Tick,
    upper_tick: Tick,
    incentive_id: IncentiveId
) -> Result<Dec, LedgerError> {
    let pool = require_pool(store, pool_id)?;
    validate_tick_range(&pool, config, lower_tick, upper_tick)?;

    let global = pool
        .incentives()
        .get(&incentive_id)
        .ok_or(LedgerError::IncentiveNotFound { pool_id, incentive_id })?
        .seconds_per_liquidity_global;

    let outside = |tick: Tick| -> Result<Dec, LedgerError> {
        Ok(tick_info(store, pool_id, tick)?
            .incentive_records
            .get(&incentive_id)
            .map(|record| record.seconds_per_liquidity_outside)
            .unwrap_or_default())
    };
    let lower_outside = outside(lower_tick)?;
    let upper_outside = outside(upper_tick)?;

    let current = pool.current_tick();
    let below =
        if current >= lower_tick { lower_outside } else { global.checked_sub(lower_outside)? };
    let above =
        if current < upper_tick { upper_outside } else { global.checked_sub(upper_outside)? };

    Ok(global.checked_sub(below)?.checked_sub(above)?)
}

/// Starts tracking `incentive_id` on the pool with a zero accumulator. Ticks
/// pick the incentive up on their next update.
pub fn add_pool_incentive<S: LedgerStore>(
    store: &mut S,
    pool_id: PoolId,
    incentive_id: IncentiveId
) -> Result<(), LedgerError> {
    let mut pool = require_pool(store, pool_id)?;
    if pool.incentives().contains_key(&incentive_id) {
        return Ok(())
    }

    pool.incentives_mut().insert(incentive_id, Default::default());
    store.set_pool(pool);
    tracing::info!("incentive {} activated on pool {}", incentive_id, pool_id);

    Ok(())
}
