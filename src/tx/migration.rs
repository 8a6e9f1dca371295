//! Partially-signed migration transactions.
//!
//! The custodial authority signs the credit transfer at build time; the
//! staker signs the migrate instruction and pays fees later in their
//! wallet.

use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

use super::instructions::{self, MigrateAccounts};
use super::{BuiltTransaction, TransactionState};
use crate::error::StakingError;
use crate::ledger::pda;
use crate::service::version_resolver::ProgramIds;

/// Builds migration transactions for one token.
#[derive(Debug, Clone, Copy)]
pub struct MigrationTransactionBuilder {
    programs: ProgramIds,
    mint: Pubkey,
    decimals: u8,
}

impl MigrationTransactionBuilder {
    /// Creates a builder.
    #[must_use]
    pub const fn new(programs: ProgramIds, mint: Pubkey, decimals: u8) -> Self {
        Self {
            programs,
            mint,
            decimals,
        }
    }

    /// Staker's destination token account.
    #[must_use]
    pub fn destination(&self, user: &Pubkey) -> Pubkey {
        get_associated_token_address(user, &self.mint)
    }

    /// Builds and partially signs the migration transaction.
    ///
    /// Instruction order: destination account creation (only when
    /// `destination_exists` is false), `migrate_account`, then the credit
    /// transfer from the custodial token account.
    ///
    /// # Errors
    ///
    /// Returns [`StakingError::TransactionBuildFailed`] if an instruction
    /// cannot be built or the custodial signature cannot be applied.
    pub fn build(
        &self,
        user: Pubkey,
        custodial: &Keypair,
        amount: u64,
        destination_exists: bool,
        recent_blockhash: Hash,
    ) -> Result<BuiltTransaction, StakingError> {
        let authority = custodial.pubkey();
        let destination = self.destination(&user);
        let source = get_associated_token_address(&authority, &self.mint);

        let mut ixs: Vec<Instruction> = Vec::with_capacity(3);
        if !destination_exists {
            ixs.push(create_associated_token_account_idempotent(
                &user,
                &user,
                &self.mint,
                &spl_token::id(),
            ));
        }

        ixs.push(instructions::migrate_account(
            self.programs.sustainable,
            &MigrateAccounts {
                user,
                legacy_user_stake: pda::user_stake_address(&user, &self.programs.legacy),
                user_stake: pda::user_stake_address(&user, &self.programs.sustainable),
                config: pda::config_address(&self.programs.sustainable),
            },
        )?);

        ixs.push(
            spl_token::instruction::transfer_checked(
                &spl_token::id(),
                &source,
                &self.mint,
                &destination,
                &authority,
                &[],
                amount,
                self.decimals,
            )
            .map_err(|e| StakingError::TransactionBuildFailed(e.to_string()))?,
        );

        let mut transaction = Transaction::new_with_payer(&ixs, Some(&user));
        transaction
            .try_partial_sign(&[custodial], recent_blockhash)
            .map_err(|e| StakingError::TransactionBuildFailed(e.to_string()))?;

        Ok(BuiltTransaction::new(
            transaction,
            TransactionState::PartiallySigned,
        ))
    }
}
