//! In-memory [`LedgerClient`] for tests and local fixtures.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;

use super::LedgerClient;
use crate::error::StakingError;

/// Ledger backed by a `HashMap`. Accounts can be inserted at any time.
#[derive(Debug)]
pub struct InMemoryLedger {
    accounts: RwLock<HashMap<Pubkey, Account>>,
    blockhash: Hash,
    unavailable: bool,
}

impl InMemoryLedger {
    /// Creates an empty ledger with a fixed blockhash.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            blockhash: Hash::new_from_array([7u8; 32]),
            unavailable: false,
        }
    }

    /// Creates a ledger whose every call fails like an unreachable RPC.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    /// Stores `data` at `address`, owned by `owner`.
    ///
    /// A poisoned lock is recovered: the map holds plain account data and
    /// stays consistent across a panicking writer.
    pub fn insert(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        let account = Account {
            lamports: 1_000_000,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        };
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address, account);
    }

    /// Returns the blockhash handed to transaction builders.
    #[must_use]
    pub const fn blockhash(&self) -> Hash {
        self.blockhash
    }

    fn check_available(&self) -> Result<(), StakingError> {
        if self.unavailable {
            return Err(StakingError::ExternalServiceError(
                "ledger unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerClient for InMemoryLedger {
    fn get_account<'a>(
        &'a self,
        address: &'a Pubkey,
    ) -> BoxFuture<'a, Result<Option<Account>, StakingError>> {
        async move {
            self.check_available()?;
            let map = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
            Ok(map.get(address).cloned())
        }
        .boxed()
    }

    fn latest_blockhash(&self) -> BoxFuture<'_, Result<Hash, StakingError>> {
        async move {
            self.check_available()?;
            Ok(self.blockhash)
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_account_is_none() {
        let ledger = InMemoryLedger::new();
        let result = ledger.get_account(&Pubkey::new_unique()).await;
        let Ok(None) = result else {
            panic!("expected no account");
        };
    }

    #[tokio::test]
    async fn inserted_account_is_returned() {
        let ledger = InMemoryLedger::new();
        let address = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        ledger.insert(address, owner, vec![1, 2, 3]);

        let Ok(Some(account)) = ledger.get_account(&address).await else {
            panic!("expected account");
        };
        assert_eq!(account.data, vec![1, 2, 3]);
        assert_eq!(account.owner, owner);
    }

    #[tokio::test]
    async fn poisoned_lock_keeps_serving() {
        let ledger = InMemoryLedger::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ledger.accounts.write();
            panic!("writer panicked");
        }));
        assert!(ledger.accounts.is_poisoned());

        let address = Pubkey::new_unique();
        ledger.insert(address, Pubkey::new_unique(), vec![9]);
        let Ok(Some(account)) = ledger.get_account(&address).await else {
            panic!("expected account after poisoning");
        };
        assert_eq!(account.data, vec![9]);
    }

    #[tokio::test]
    async fn unavailable_ledger_errors() {
        let ledger = InMemoryLedger::unavailable();
        let Err(StakingError::ExternalServiceError(_)) = ledger.latest_blockhash().await else {
            panic!("expected external service error");
        };
    }
}
