use std::collections::BTreeSet;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{IncentiveId, PoolId, dec::Dec, tick_math::Tick};

/// Identifies a position. An owner may hold an incentivized and a plain
/// position over the same range side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey {
    pub pool_id:      PoolId,
    pub owner:        Address,
    pub lower_tick:   Tick,
    pub upper_tick:   Tick,
    pub incentivized: bool
}

impl PositionKey {
    pub fn new(
        pool_id: PoolId,
        owner: Address,
        lower_tick: Tick,
        upper_tick: Tick,
        incentive_ids: &BTreeSet<IncentiveId>
    ) -> Self {
        Self { pool_id, owner, lower_tick, upper_tick, incentivized: !incentive_ids.is_empty() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub key:           PositionKey,
    pub liquidity:     Dec,
    pub incentive_ids: BTreeSet<IncentiveId>
}

impl Position {
    pub fn new(key: PositionKey, incentive_ids: BTreeSet<IncentiveId>) -> Self {
        Self { key, liquidity: Dec::ZERO, incentive_ids }
    }

    pub fn is_committed_to(&self, incentive_ids: &BTreeSet<IncentiveId>) -> bool {
        &self.incentive_ids == incentive_ids
    }
}
