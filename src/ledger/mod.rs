//! Ledger collaborator: account reads and blockhash lookup.
//!
//! The engine never writes to the ledger. [`LedgerClient`] is object safe
//! so the service can hold an `Arc<dyn LedgerClient>` and tests can swap
//! in [`InMemoryLedger`].

pub mod layout;
pub mod memory;
pub mod pda;
pub mod rpc;

use std::fmt;

use futures_util::future::BoxFuture;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;

use crate::error::StakingError;

pub use memory::InMemoryLedger;
pub use rpc::RpcLedger;

/// Read access to on-chain state.
///
/// Implementations do not retry: a retried read on a time-sensitive
/// accrual may change the answer, so retrying is the caller's call.
pub trait LedgerClient: Send + Sync + fmt::Debug {
    /// Fetches an account. `Ok(None)` means the account does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StakingError::ExternalServiceError`] if the ledger cannot
    /// be reached.
    fn get_account<'a>(
        &'a self,
        address: &'a Pubkey,
    ) -> BoxFuture<'a, Result<Option<Account>, StakingError>>;

    /// Returns a recent blockhash for transaction construction.
    ///
    /// # Errors
    ///
    /// Returns [`StakingError::ExternalServiceError`] if the ledger cannot
    /// be reached.
    fn latest_blockhash(&self) -> BoxFuture<'_, Result<Hash, StakingError>>;
}
