// Re-export both crates under short names
pub use cl_keeper as keeper;
// The types most callers need, at the root level
pub use cl_keeper::{
    Bank, BankError, CreatedPosition, Keeper, LedgerConfig, LedgerError, LedgerStore, ManualClock,
    MemoryBank, MemoryStore, Metrics, SecondsInactiveMode, SharedBank, SharedLedger
};
pub use cl_structure as structure;
pub use cl_structure::{
    Amount, Coin, ConcentratedLiquidityPool, ConcentratedPool, Dec, IncentiveId, MathError, PoolId,
    Position, PositionKey, Tick, TickInfo, Timestamp
};
