//! Transaction construction for external signing.
//!
//! Builders only ever produce [`TransactionState::Built`] or
//! [`TransactionState::PartiallySigned`] transactions. Full signing,
//! submission, and confirmation belong to the wallet and RPC.

pub mod instructions;
pub mod migration;
pub mod unstake;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use solana_sdk::transaction::Transaction;
use utoipa::ToSchema;

use crate::error::StakingError;

pub use migration::MigrationTransactionBuilder;
pub use unstake::UnstakeTransactionBuilder;

/// Lifecycle stage of a transaction leaving this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// No signatures yet.
    Built,
    /// Some, but not all, required signatures are present.
    PartiallySigned,
}

/// A transaction ready to hand to a wallet.
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    transaction: Transaction,
    state: TransactionState,
}

impl BuiltTransaction {
    /// Wraps a transaction in the given state.
    #[must_use]
    pub const fn new(transaction: Transaction, state: TransactionState) -> Self {
        Self { transaction, state }
    }

    /// The wrapped transaction.
    #[must_use]
    pub const fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    /// Wire-format bytes, base64 encoded.
    ///
    /// # Errors
    ///
    /// Returns [`StakingError::SerializationFailed`] if encoding fails.
    pub fn to_base64(&self) -> Result<String, StakingError> {
        let bytes = bincode::serialize(&self.transaction)
            .map_err(|e| StakingError::SerializationFailed(e.to_string()))?;
        Ok(STANDARD.encode(bytes))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::system_instruction;

    #[test]
    fn base64_round_trips_to_same_transaction() {
        let payer = Pubkey::new_unique();
        let ix = system_instruction::transfer(&payer, &Pubkey::new_unique(), 1);
        let tx = Transaction::new_with_payer(&[ix], Some(&payer));
        let built = BuiltTransaction::new(tx.clone(), TransactionState::Built);

        let Ok(encoded) = built.to_base64() else {
            panic!("serialization failed");
        };
        let Ok(bytes) = STANDARD.decode(encoded) else {
            panic!("invalid base64");
        };
        let Ok(decoded) = bincode::deserialize::<Transaction>(&bytes) else {
            panic!("invalid transaction bytes");
        };
        assert_eq!(decoded, tx);
    }
}
