use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{IncentiveId, dec::Dec, error::MathError, liquidity_math::add_liquidity};

/// Liquidity referencing one tick boundary on behalf of a single incentive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickIncentivizedLiquidityRecord {
    pub liquidity_gross:               Dec,
    pub liquidity_net:                 Dec,
    pub seconds_per_liquidity_outside: Dec
}

impl TickIncentivizedLiquidityRecord {
    pub fn update_liquidity(&mut self, liquidity_delta: Dec, upper: bool) -> Result<(), MathError> {
        (self.liquidity_gross, self.liquidity_net) =
            apply_delta(self.liquidity_gross, self.liquidity_net, liquidity_delta, upper)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInfo {
    pub liquidity_gross:   Dec,
    pub liquidity_net:     Dec,
    pub seconds_inactive:  Duration,
    pub incentive_records: BTreeMap<IncentiveId, TickIncentivizedLiquidityRecord>
}

impl TickInfo {
    /// No liquidity references this boundary.
    pub fn is_inactive(&self) -> bool {
        self.liquidity_gross.is_zero() && self.liquidity_net.is_zero()
    }

    /// Gross grows by `liquidity_delta`; net grows for a lower boundary and
    /// shrinks for an upper one.
    pub fn update_liquidity(&mut self, liquidity_delta: Dec, upper: bool) -> Result<(), MathError> {
        (self.liquidity_gross, self.liquidity_net) =
            apply_delta(self.liquidity_gross, self.liquidity_net, liquidity_delta, upper)?;
        Ok(())
    }

    /// Inserts a zeroed record for every id not yet tracked. Existing records
    /// are left as they are.
    pub fn reconcile_incentives(&mut self, incentive_ids: impl IntoIterator<Item = IncentiveId>) {
        for id in incentive_ids {
            self.incentive_records.entry(id).or_default();
        }
    }
}

fn apply_delta(gross: Dec, net: Dec, delta: Dec, upper: bool) -> Result<(Dec, Dec), MathError> {
    let gross = add_liquidity(gross, delta)?;
    let net = if upper { net.checked_sub(delta)? } else { net.checked_add(delta)? };

    Ok((gross, net))
}
