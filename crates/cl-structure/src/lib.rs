use std::{ops::Add, time::Duration};

use serde::{Deserialize, Serialize};

pub mod dec;
pub mod error;
pub mod liquidity_math;
pub mod pool;
pub mod position;
pub mod tick_info;
pub mod tick_math;

pub use dec::Dec;
pub use error::MathError;
pub use pool::{ConcentratedLiquidityPool, ConcentratedPool, PoolIncentiveRecord};
pub use position::{Position, PositionKey};
pub use tick_info::{TickIncentivizedLiquidityRecord, TickInfo};
pub use tick_math::{MAX_TICK, MIN_TICK, Tick};

pub type PoolId = u64;
pub type IncentiveId = u64;
pub type Amount = u128;

/// Block time in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Elapsed time since `earlier`, zero if `earlier` is in the future.
    pub fn saturating_duration_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        let nanos = u64::try_from(rhs.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(nanos))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom:  String,
    pub amount: Amount
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Amount) -> Self {
        Self { denom: denom.into(), amount }
    }
}
