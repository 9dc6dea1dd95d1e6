use cl_structure::{Amount, Dec, IncentiveId, MathError, PoolId, Tick};
use thiserror::Error;

use crate::bank::BankError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("pool {pool_id} not found")]
    PoolNotFound { pool_id: PoolId },
    #[error("{} tick {tick} is outside of the allowed range", boundary(.is_lower))]
    InvalidTick { tick: Tick, is_lower: bool },
    #[error("lower tick {lower_tick} must be below upper tick {upper_tick}")]
    InvalidLowerUpperTick { lower_tick: Tick, upper_tick: Tick },
    #[error("ticks {lower_tick}/{upper_tick} are not multiples of tick spacing {tick_spacing}")]
    TickSpacing { lower_tick: Tick, upper_tick: Tick, tick_spacing: u64 },
    #[error("first position must provide both assets, got {amount0} and {amount1}")]
    InitialLiquidityZero { amount0: Amount, amount1: Amount },
    #[error("created {actual} of {} which is below the minimum of {minimum}", token(.is_token_zero))]
    InsufficientLiquidityCreated { actual: Amount, minimum: Amount, is_token_zero: bool },
    #[error("liquidity delta must be positive")]
    ZeroLiquidityDelta,
    #[error("no position in pool {pool_id} over [{lower_tick}, {upper_tick})")]
    PositionNotFound { pool_id: PoolId, lower_tick: Tick, upper_tick: Tick },
    #[error("requested {actual} liquidity but the position only holds {available}")]
    InsufficientLiquidity { actual: Dec, available: Dec },
    #[error("incentive {incentive_id} is not active on pool {pool_id}")]
    IncentiveNotFound { pool_id: PoolId, incentive_id: IncentiveId },
    #[error("position is committed to incentives {committed:?}, got {requested:?}")]
    IncentiveCommitmentMismatch { committed: Vec<IncentiveId>, requested: Vec<IncentiveId> },
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Bank(#[from] BankError)
}

fn boundary(is_lower: &bool) -> &'static str {
    if *is_lower { "lower" } else { "upper" }
}

fn token(is_token_zero: &bool) -> &'static str {
    if *is_token_zero { "token0" } else { "token1" }
}
