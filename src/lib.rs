//! # sse-staking-gateway
//!
//! Reward accounting and transaction gateway for the SSE staking programs.
//!
//! The gateway reads pool and stake accounts from the ledger, decides
//! which of the two program layouts is live, computes time-weighted
//! rewards in fixed-point integers, and builds unstake and migration
//! transactions for the staker's wallet to sign. It never submits
//! anything itself.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── StakingService (service/)
//!     │     ├── VersionResolver
//!     │     ├── RewardAccrualCalculator (domain/)
//!     │     ├── MigrationRewardComputer (domain/)
//!     │     └── Unstake / Migration builders (tx/)
//!     │
//!     ├── LedgerClient (ledger/) ── Solana RPC
//!     └── SnapshotStore (snapshot) ── migration fairness JSON
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod service;
pub mod snapshot;
pub mod tx;
