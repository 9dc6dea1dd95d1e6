use std::collections::BTreeMap;

use alloy_primitives::{Address, keccak256};
use serde::{Deserialize, Serialize};

use crate::{
    IncentiveId, PoolId, Timestamp,
    dec::Dec,
    error::MathError,
    liquidity_math::{add_liquidity, calc_amount0_delta, calc_amount1_delta},
    tick_math::Tick
};

/// Global time-weighted accumulator of one incentive on a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolIncentiveRecord {
    pub seconds_per_liquidity_global: Dec
}

/// State of a concentrated-liquidity venue as seen by the ledger. Pool
/// creation lives elsewhere; the ledger only reads the tick and time fields,
/// initialises the price on the first deposit and keeps the active liquidity
/// and incentive accumulators current.
pub trait ConcentratedPool {
    fn id(&self) -> PoolId;
    /// Account that holds the pool's tokens.
    fn address(&self) -> Address;
    fn token0(&self) -> &str;
    fn token1(&self) -> &str;
    fn tick_spacing(&self) -> u64;
    fn current_tick(&self) -> Tick;
    fn current_sqrt_price(&self) -> Dec;
    /// Liquidity of all positions whose range contains the current tick.
    fn liquidity(&self) -> Dec;
    fn time_of_creation(&self) -> Timestamp;
    fn incentives(&self) -> &BTreeMap<IncentiveId, PoolIncentiveRecord>;
    fn incentives_mut(&mut self) -> &mut BTreeMap<IncentiveId, PoolIncentiveRecord>;

    fn set_current_sqrt_price(&mut self, sqrt_price: Dec);
    fn set_current_tick(&mut self, tick: Tick);
    fn set_liquidity(&mut self, liquidity: Dec);

    fn is_current_tick_in_range(&self, lower_tick: Tick, upper_tick: Tick) -> bool {
        let current = self.current_tick();
        lower_tick <= current && current < upper_tick
    }

    /// Applies `liquidity_delta` to the active liquidity when the range
    /// contains the current tick. Returns whether it did.
    fn update_liquidity_if_active_position(
        &mut self,
        lower_tick: Tick,
        upper_tick: Tick,
        liquidity_delta: Dec
    ) -> Result<bool, MathError> {
        if !self.is_current_tick_in_range(lower_tick, upper_tick) {
            return Ok(false)
        }

        let updated = add_liquidity(self.liquidity(), liquidity_delta)?;
        self.set_liquidity(updated);
        Ok(true)
    }

    /// Token amounts backing `liquidity_delta` over the range at the current
    /// price. Signs follow the delta.
    fn calc_actual_amounts(
        &self,
        lower_tick: Tick,
        upper_tick: Tick,
        sqrt_price_lower: Dec,
        sqrt_price_upper: Dec,
        liquidity_delta: Dec
    ) -> Result<(Dec, Dec), MathError> {
        if self.is_current_tick_in_range(lower_tick, upper_tick) {
            let sqrt_price = self.current_sqrt_price();
            let amount0 = calc_amount0_delta(liquidity_delta, sqrt_price, sqrt_price_upper)?;
            let amount1 = calc_amount1_delta(liquidity_delta, sqrt_price, sqrt_price_lower)?;
            Ok((amount0, amount1))
        } else if self.current_tick() < lower_tick {
            let amount0 = calc_amount0_delta(liquidity_delta, sqrt_price_lower, sqrt_price_upper)?;
            Ok((amount0, Dec::ZERO))
        } else {
            let amount1 = calc_amount1_delta(liquidity_delta, sqrt_price_lower, sqrt_price_upper)?;
            Ok((Dec::ZERO, amount1))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcentratedLiquidityPool {
    id:                 PoolId,
    address:            Address,
    token0:             String,
    token1:             String,
    tick_spacing:       u64,
    current_tick:       Tick,
    current_sqrt_price: Dec,
    liquidity:          Dec,
    time_of_creation:   Timestamp,
    incentives:         BTreeMap<IncentiveId, PoolIncentiveRecord>
}

impl ConcentratedLiquidityPool {
    /// A fresh pool with no price. Its custody address is derived from the id.
    pub fn new(
        id: PoolId,
        token0: impl Into<String>,
        token1: impl Into<String>,
        tick_spacing: u64,
        time_of_creation: Timestamp
    ) -> Self {
        Self {
            id,
            address: pool_address(id),
            token0: token0.into(),
            token1: token1.into(),
            tick_spacing,
            current_tick: 0,
            current_sqrt_price: Dec::ZERO,
            liquidity: Dec::ZERO,
            time_of_creation,
            incentives: BTreeMap::new()
        }
    }

    pub fn with_incentives(mut self, incentive_ids: impl IntoIterator<Item = IncentiveId>) -> Self {
        for id in incentive_ids {
            self.incentives.entry(id).or_default();
        }
        self
    }
}

pub fn pool_address(id: PoolId) -> Address {
    let mut preimage = b"concentrated-liquidity-pool".to_vec();
    preimage.extend_from_slice(&id.to_be_bytes());
    Address::from_word(keccak256(preimage))
}

impl ConcentratedPool for ConcentratedLiquidityPool {
    fn id(&self) -> PoolId {
        self.id
    }

    fn address(&self) -> Address {
        self.address
    }

    fn token0(&self) -> &str {
        &self.token0
    }

    fn token1(&self) -> &str {
        &self.token1
    }

    fn tick_spacing(&self) -> u64 {
        self.tick_spacing
    }

    fn current_tick(&self) -> Tick {
        self.current_tick
    }

    fn current_sqrt_price(&self) -> Dec {
        self.current_sqrt_price
    }

    fn liquidity(&self) -> Dec {
        self.liquidity
    }

    fn time_of_creation(&self) -> Timestamp {
        self.time_of_creation
    }

    fn incentives(&self) -> &BTreeMap<IncentiveId, PoolIncentiveRecord> {
        &self.incentives
    }

    fn incentives_mut(&mut self) -> &mut BTreeMap<IncentiveId, PoolIncentiveRecord> {
        &mut self.incentives
    }

    fn set_current_sqrt_price(&mut self, sqrt_price: Dec) {
        self.current_sqrt_price = sqrt_price;
    }

    fn set_current_tick(&mut self, tick: Tick) {
        self.current_tick = tick;
    }

    fn set_liquidity(&mut self, liquidity: Dec) {
        self.liquidity = liquidity;
    }
}
