//! [`LedgerClient`] backed by the JSON-RPC endpoint.

use std::fmt;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;

use super::LedgerClient;
use crate::error::StakingError;

/// RPC-backed ledger reader at `confirmed` commitment.
pub struct RpcLedger {
    client: RpcClient,
}

impl RpcLedger {
    /// Creates a client for `url` with the given request timeout.
    #[must_use]
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                url,
                timeout,
                CommitmentConfig::confirmed(),
            ),
        }
    }
}

impl fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcLedger")
            .field("url", &self.client.url())
            .finish()
    }
}

impl LedgerClient for RpcLedger {
    fn get_account<'a>(
        &'a self,
        address: &'a Pubkey,
    ) -> BoxFuture<'a, Result<Option<Account>, StakingError>> {
        async move {
            let response = self
                .client
                .get_account_with_commitment(address, self.client.commitment())
                .await
                .map_err(|e| {
                    tracing::warn!(%address, error = %e, "account fetch failed");
                    StakingError::ExternalServiceError(e.to_string())
                })?;
            Ok(response.value)
        }
        .boxed()
    }

    fn latest_blockhash(&self) -> BoxFuture<'_, Result<Hash, StakingError>> {
        async move {
            self.client.get_latest_blockhash().await.map_err(|e| {
                tracing::warn!(error = %e, "blockhash fetch failed");
                StakingError::ExternalServiceError(e.to_string())
            })
        }
        .boxed()
    }
}
