//! Unsigned withdrawal transactions against the resolved program layout.

use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

use super::instructions::{self, UnstakeAccounts};
use super::{BuiltTransaction, TransactionState};
use crate::domain::token_amount::parse_decimal_amount;
use crate::error::StakingError;
use crate::ledger::pda;
use crate::service::version_resolver::ResolvedVersion;

/// Inputs of one unstake build.
#[derive(Debug, Clone, Copy)]
pub struct UnstakeParams<'a> {
    /// Resolved program layout and pool state.
    pub resolved: &'a ResolvedVersion,
    /// Requested amount as a decimal string, e.g. `"12.5"`.
    pub amount: &'a str,
    /// Staker wallet; fee payer and sole signer.
    pub user_wallet: Pubkey,
    /// Whether the staker's associated token account already exists.
    pub user_token_account_exists: bool,
    /// Blockhash the wallet will sign against.
    pub recent_blockhash: Hash,
}

/// Builds unstake transactions for a token with fixed decimals.
#[derive(Debug, Clone, Copy)]
pub struct UnstakeTransactionBuilder {
    decimals: u8,
}

impl UnstakeTransactionBuilder {
    /// Creates a builder for a token with `decimals` decimals.
    #[must_use]
    pub const fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    /// Converts a decimal amount to base units, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`StakingError::InvalidAmount`] for malformed input or an
    /// amount that floors to zero base units.
    pub fn parse_amount(&self, amount: &str) -> Result<u64, StakingError> {
        let base_units = parse_decimal_amount(amount, self.decimals)?;
        if base_units == 0 {
            return Err(StakingError::InvalidAmount(format!(
                "{amount} rounds to zero base units"
            )));
        }
        Ok(base_units)
    }

    /// Builds the unsigned transaction.
    ///
    /// The staker's token account is created idempotently first when it
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// - [`StakingError::InvalidAmount`] as in [`Self::parse_amount`].
    /// - [`StakingError::TransactionBuildFailed`] if instruction encoding
    ///   fails.
    pub fn build(&self, params: &UnstakeParams<'_>) -> Result<BuiltTransaction, StakingError> {
        let amount = self.parse_amount(params.amount)?;
        let resolved = params.resolved;
        let mint = resolved.config.token_mint();
        let user_token = get_associated_token_address(&params.user_wallet, &mint);

        let mut ixs: Vec<Instruction> = Vec::with_capacity(2);
        if !params.user_token_account_exists {
            ixs.push(create_associated_token_account_idempotent(
                &params.user_wallet,
                &params.user_wallet,
                &mint,
                &spl_token::id(),
            ));
        }

        let accounts = UnstakeAccounts {
            user: params.user_wallet,
            config: resolved.config_address,
            user_stake: resolved.user_account_address,
            user_token,
            pool_vault: resolved.config.pool_vault(),
            reward_vault: resolved.config.reward_vault(),
            vault_authority: pda::vault_authority_address(&resolved.program_id),
            mint,
        };
        ixs.push(instructions::unstake(resolved.program_id, &accounts, amount)?);

        let mut transaction = Transaction::new_with_payer(&ixs, Some(&params.user_wallet));
        transaction.message.recent_blockhash = params.recent_blockhash;

        Ok(BuiltTransaction::new(transaction, TransactionState::Built))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::PoolConfig;
    use crate::service::version_resolver::tests::{legacy_config, sustainable_config};

    fn resolved(config: PoolConfig) -> ResolvedVersion {
        ResolvedVersion {
            program_id: Pubkey::new_unique(),
            config_address: Pubkey::new_unique(),
            user_account_address: Pubkey::new_unique(),
            config,
        }
    }

    fn build(
        resolved: &ResolvedVersion,
        amount: &str,
        exists: bool,
    ) -> Result<BuiltTransaction, StakingError> {
        UnstakeTransactionBuilder::new(6).build(&UnstakeParams {
            resolved,
            amount,
            user_wallet: Pubkey::new_unique(),
            user_token_account_exists: exists,
            recent_blockhash: Hash::new_unique(),
        })
    }

    #[test]
    fn legacy_unstake_has_single_instruction() {
        let r = resolved(legacy_config().into());
        let Ok(built) = build(&r, "12.5", true) else {
            panic!("build failed");
        };
        assert_eq!(built.state(), TransactionState::Built);
        let message = &built.transaction().message;
        assert_eq!(message.instructions.len(), 1);
        assert!(built.transaction().signatures.iter().all(|s| *s == Default::default()));
        assert!(!message.account_keys.contains(&Pubkey::new_from_array([4; 32])));
    }

    #[test]
    fn sustainable_unstake_references_reward_vault() {
        let r = resolved(sustainable_config(1).into());
        let Ok(built) = build(&r, "1", true) else {
            panic!("build failed");
        };
        let keys = &built.transaction().message.account_keys;
        assert!(keys.contains(&Pubkey::new_from_array([4; 32])));
        assert!(keys.contains(&Pubkey::new_from_array([3; 32])));
    }

    #[test]
    fn missing_token_account_is_created_first() {
        let r = resolved(legacy_config().into());
        let Ok(built) = build(&r, "1", false) else {
            panic!("build failed");
        };
        let message = &built.transaction().message;
        assert_eq!(message.instructions.len(), 2);
        let first_program = message
            .instructions
            .first()
            .and_then(|ix| message.account_keys.get(usize::from(ix.program_id_index)));
        assert_eq!(first_program, Some(&spl_associated_token_account::id()));
    }

    #[test]
    fn dust_amount_is_rejected() {
        let r = resolved(legacy_config().into());
        let Err(StakingError::InvalidAmount(_)) = build(&r, "0.0000001", true) else {
            panic!("expected InvalidAmount");
        };
        let Err(StakingError::InvalidAmount(_)) = build(&r, "0", true) else {
            panic!("expected InvalidAmount");
        };
    }

    #[test]
    fn amount_is_encoded_in_base_units() {
        let Ok(units) = UnstakeTransactionBuilder::new(6).parse_amount("12.5") else {
            panic!("parse failed");
        };
        assert_eq!(units, 12_500_000);
    }
}
