pub mod bank;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod keeper;
pub mod metrics;
pub mod position_manager;
pub mod shared;
pub mod store;
pub mod tick_cross;
pub mod tick_ledger;

pub use bank::{Bank, BankError, MemoryBank, SharedBank};
pub use cache::{CacheStore, StagedWrites};
pub use clock::{Clock, ManualClock};
pub use config::{LedgerConfig, SecondsInactiveMode};
pub use error::LedgerError;
pub use keeper::Keeper;
pub use metrics::{Metrics, source_of};
pub use position_manager::{CreatedPosition, is_initial_position};
pub use shared::SharedLedger;
pub use store::{LedgerStore, MemoryStore};
