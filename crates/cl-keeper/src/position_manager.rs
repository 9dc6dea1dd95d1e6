//! Position creation and withdrawal against a store. Token movements are
//! left to the caller, which settles them once the ledger side succeeded.

use std::collections::BTreeSet;

use alloy_primitives::Address;
use cl_structure::{
    Amount, ConcentratedPool, Dec, IncentiveId, PoolId, Position, PositionKey, Tick, Timestamp,
    liquidity_math::get_liquidity_from_amounts,
    tick_math::{price_to_tick, tick_to_sqrt_price}
};

use crate::{
    config::LedgerConfig,
    error::LedgerError,
    store::LedgerStore,
    tick_ledger::{init_or_update_tick, require_pool}
};

/// Outcome of a successful deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedPosition {
    pub amount0:   Amount,
    pub amount1:   Amount,
    pub liquidity: Dec
}

/// Checks in order: tick spacing, lower bound, upper bound, ordering.
pub fn validate_tick_range<P: ConcentratedPool>(
    pool: &P,
    config: &LedgerConfig,
    lower_tick: Tick,
    upper_tick: Tick
) -> Result<(), LedgerError> {
    let tick_spacing = pool.tick_spacing();
    let spacing = i64::try_from(tick_spacing).unwrap_or(i64::MAX);
    if spacing == 0 || lower_tick % spacing != 0 || upper_tick % spacing != 0 {
        return Err(LedgerError::TickSpacing { lower_tick, upper_tick, tick_spacing })
    }

    if lower_tick < config.min_tick || lower_tick >= config.max_tick {
        return Err(LedgerError::InvalidTick { tick: lower_tick, is_lower: true })
    }
    if upper_tick > config.max_tick || upper_tick <= config.min_tick {
        return Err(LedgerError::InvalidTick { tick: upper_tick, is_lower: false })
    }
    if lower_tick >= upper_tick {
        return Err(LedgerError::InvalidLowerUpperTick { lower_tick, upper_tick })
    }

    Ok(())
}

/// A pool without price and tick has never received liquidity.
pub fn is_initial_position(current_sqrt_price: Dec, current_tick: Tick) -> bool {
    current_sqrt_price.is_zero() && current_tick == 0
}

/// Prices a fresh pool from the ratio of the first deposit.
pub fn initialize_initial_position<P: ConcentratedPool>(
    pool: &mut P,
    amount0: Amount,
    amount1: Amount
) -> Result<(), LedgerError> {
    if amount0 == 0 || amount1 == 0 {
        return Err(LedgerError::InitialLiquidityZero { amount0, amount1 })
    }

    let price = Dec::from_amount(amount1).checked_quo(Dec::from_amount(amount0))?;
    let sqrt_price = price.checked_sqrt()?;
    let tick = price_to_tick(price)?;

    pool.set_current_sqrt_price(sqrt_price);
    pool.set_current_tick(tick);
    tracing::info!("pool {} initialised at tick {} with sqrt price {}", pool.id(), tick, sqrt_price);

    Ok(())
}

fn require_active_incentives<P: ConcentratedPool>(
    pool: &P,
    incentive_ids: &BTreeSet<IncentiveId>
) -> Result<(), LedgerError> {
    match incentive_ids.iter().find(|id| !pool.incentives().contains_key(*id)) {
        Some(incentive_id) => {
            Err(LedgerError::IncentiveNotFound { pool_id: pool.id(), incentive_id: *incentive_id })
        }
        None => Ok(())
    }
}

fn require_same_commitment(position: &Position, incentive_ids: &BTreeSet<IncentiveId>) -> Result<(), LedgerError> {
    if position.is_committed_to(incentive_ids) {
        return Ok(())
    }

    Err(LedgerError::IncentiveCommitmentMismatch {
        committed: position.incentive_ids.iter().copied().collect(),
        requested: incentive_ids.iter().copied().collect()
    })
}

/// Applies `liquidity_delta` to both boundaries, the active liquidity and
/// the position record.
fn update_position<S: LedgerStore>(
    store: &mut S,
    now: Timestamp,
    mut position: Position,
    liquidity_delta: Dec
) -> Result<(), LedgerError> {
    let key = position.key;
    let ids = position.incentive_ids.clone();

    init_or_update_tick(store, now, key.pool_id, key.lower_tick, liquidity_delta, false, &ids)?;
    init_or_update_tick(store, now, key.pool_id, key.upper_tick, liquidity_delta, true, &ids)?;

    let mut pool = require_pool(store, key.pool_id)?;
    if pool.update_liquidity_if_active_position(key.lower_tick, key.upper_tick, liquidity_delta)? {
        store.set_pool(pool);
    }

    position.liquidity = position.liquidity.checked_add(liquidity_delta)?;
    if position.liquidity.is_zero() {
        store.remove_position(&key);
    } else {
        store.set_position(position);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn create_position<S: LedgerStore>(
    store: &mut S,
    now: Timestamp,
    config: &LedgerConfig,
    pool_id: PoolId,
    owner: Address,
    amount0_desired: Amount,
    amount1_desired: Amount,
    amount0_min: Amount,
    amount1_min: Amount,
    lower_tick: Tick,
    upper_tick: Tick,
    incentive_ids: &BTreeSet<IncentiveId>
) -> Result<CreatedPosition, LedgerError> {
    let mut pool = require_pool(store, pool_id)?;
    validate_tick_range(&pool, config, lower_tick, upper_tick)?;
    require_active_incentives(&pool, incentive_ids)?;

    if is_initial_position(pool.current_sqrt_price(), pool.current_tick()) {
        initialize_initial_position(&mut pool, amount0_desired, amount1_desired)?;
        store.set_pool(pool.clone());
    }

    let sqrt_price_lower = tick_to_sqrt_price(lower_tick)?;
    let sqrt_price_upper = tick_to_sqrt_price(upper_tick)?;
    let liquidity = get_liquidity_from_amounts(
        pool.current_sqrt_price(),
        sqrt_price_lower,
        sqrt_price_upper,
        amount0_desired,
        amount1_desired
    )?;
    if !liquidity.is_positive() {
        return Err(LedgerError::ZeroLiquidityDelta)
    }

    let (amount0, amount1) =
        pool.calc_actual_amounts(lower_tick, upper_tick, sqrt_price_lower, sqrt_price_upper, liquidity)?;
    let amount0 = amount0.truncate_to_amount()?;
    let amount1 = amount1.truncate_to_amount()?;
    if amount0 < amount0_min {
        return Err(LedgerError::InsufficientLiquidityCreated {
            actual:        amount0,
            minimum:       amount0_min,
            is_token_zero: true
        })
    }
    if amount1 < amount1_min {
        return Err(LedgerError::InsufficientLiquidityCreated {
            actual:        amount1,
            minimum:       amount1_min,
            is_token_zero: false
        })
    }

    let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick, incentive_ids);
    let position = match store.position(&key) {
        Some(existing) => {
            require_same_commitment(&existing, incentive_ids)?;
            existing
        }
        None => Position::new(key, incentive_ids.clone())
    };
    update_position(store, now, position, liquidity)?;

    tracing::debug!(
        "created position on pool {} [{}, {}): liquidity {}, amounts {}/{}",
        pool_id,
        lower_tick,
        upper_tick,
        liquidity,
        amount0,
        amount1
    );
    Ok(CreatedPosition { amount0, amount1, liquidity })
}

/// Removes `liquidity` from a position and returns the token amounts it
/// releases.
#[allow(clippy::too_many_arguments)]
pub fn withdraw_position<S: LedgerStore>(
    store: &mut S,
    now: Timestamp,
    config: &LedgerConfig,
    pool_id: PoolId,
    owner: Address,
    lower_tick: Tick,
    upper_tick: Tick,
    liquidity: Dec,
    incentive_ids: &BTreeSet<IncentiveId>
) -> Result<(Amount, Amount), LedgerError> {
    let pool = require_pool(store, pool_id)?;
    validate_tick_range(&pool, config, lower_tick, upper_tick)?;

    let key = PositionKey::new(pool_id, owner, lower_tick, upper_tick, incentive_ids);
    let position = store
        .position(&key)
        .ok_or(LedgerError::PositionNotFound { pool_id, lower_tick, upper_tick })?;
    require_same_commitment(&position, incentive_ids)?;

    if !liquidity.is_positive() {
        return Err(LedgerError::ZeroLiquidityDelta)
    }
    if liquidity > position.liquidity {
        return Err(LedgerError::InsufficientLiquidity { actual: liquidity, available: position.liquidity })
    }

    let liquidity_delta = -liquidity;
    let (amount0, amount1) = pool.calc_actual_amounts(
        lower_tick,
        upper_tick,
        tick_to_sqrt_price(lower_tick)?,
        tick_to_sqrt_price(upper_tick)?,
        liquidity_delta
    )?;
    update_position(store, now, position, liquidity_delta)?;

    let amount0 = amount0.abs().truncate_to_amount()?;
    let amount1 = amount1.abs().truncate_to_amount()?;

    tracing::debug!(
        "withdrew {} liquidity from pool {} [{}, {}): amounts {}/{}",
        liquidity,
        pool_id,
        lower_tick,
        upper_tick,
        amount0,
        amount1
    );
    Ok((amount0, amount1))
}
