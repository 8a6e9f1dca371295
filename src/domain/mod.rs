//! Domain layer: fixed-point math, pool state, accrual, migration credits.
//!
//! Everything here is synchronous and free of I/O. The service layer feeds
//! it snapshots read from the ledger and the migration artifact.

pub mod accrual;
pub mod fixed_point;
pub mod migration;
pub mod pool;
pub mod token_amount;

pub use accrual::{AccrualResult, EarningRates, RewardAccrualCalculator};
pub use fixed_point::{MathError, PRECISION};
pub use migration::{
    ClaimStatus, MigrationRewardComputer, MigrationSnapshot, RewardBreakdown, WalletAnalysis,
};
pub use pool::{
    LegacyPoolConfig, PoolConfig, ProgramVersion, SustainablePoolConfig, SystemType, UserPosition,
};
