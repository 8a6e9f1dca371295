//! Staking program instruction encoders.
//!
//! Data is the Anchor `global:<name>` discriminator followed by Borsh
//! arguments.

use borsh::BorshSerialize;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::error::StakingError;
use crate::ledger::layout::discriminator;

/// Accounts of an `unstake` instruction.
#[derive(Debug, Clone, Copy)]
pub struct UnstakeAccounts {
    /// Staker, signer and fee payer.
    pub user: Pubkey,
    /// Pool configuration.
    pub config: Pubkey,
    /// Staker's stake account.
    pub user_stake: Pubkey,
    /// Staker's token account receiving the withdrawal.
    pub user_token: Pubkey,
    /// Pool deposit vault.
    pub pool_vault: Pubkey,
    /// Pool reward vault; sustainable layout only.
    pub reward_vault: Option<Pubkey>,
    /// Vault authority PDA.
    pub vault_authority: Pubkey,
    /// Token mint.
    pub mint: Pubkey,
}

/// Accounts of a `migrate_account` instruction.
#[derive(Debug, Clone, Copy)]
pub struct MigrateAccounts {
    /// Staker, signer and fee payer.
    pub user: Pubkey,
    /// Staker's legacy stake account.
    pub legacy_user_stake: Pubkey,
    /// Staker's sustainable stake account, created by the program.
    pub user_stake: Pubkey,
    /// Sustainable pool configuration.
    pub config: Pubkey,
}

#[derive(BorshSerialize)]
struct UnstakeArgs {
    amount: u64,
}

fn instruction_data<T: BorshSerialize>(name: &str, args: &T) -> Result<Vec<u8>, StakingError> {
    let mut data = discriminator("global", name).to_vec();
    args.serialize(&mut data)
        .map_err(|e| StakingError::TransactionBuildFailed(e.to_string()))?;
    Ok(data)
}

/// Encodes `unstake(amount)` for `program_id`.
///
/// The reward vault is appended after the pool vault only when present.
///
/// # Errors
///
/// Returns [`StakingError::TransactionBuildFailed`] if argument encoding
/// fails.
pub fn unstake(
    program_id: Pubkey,
    accounts: &UnstakeAccounts,
    amount: u64,
) -> Result<Instruction, StakingError> {
    let mut metas = vec![
        AccountMeta::new(accounts.user, true),
        AccountMeta::new(accounts.config, false),
        AccountMeta::new(accounts.user_stake, false),
        AccountMeta::new(accounts.user_token, false),
        AccountMeta::new(accounts.pool_vault, false),
    ];
    if let Some(reward_vault) = accounts.reward_vault {
        metas.push(AccountMeta::new(reward_vault, false));
    }
    metas.extend([
        AccountMeta::new_readonly(accounts.vault_authority, false),
        AccountMeta::new_readonly(accounts.mint, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ]);

    Ok(Instruction {
        program_id,
        accounts: metas,
        data: instruction_data("unstake", &UnstakeArgs { amount })?,
    })
}

/// Encodes the one-time `migrate_account()` for `program_id`.
///
/// # Errors
///
/// Returns [`StakingError::TransactionBuildFailed`] if encoding fails.
pub fn migrate_account(
    program_id: Pubkey,
    accounts: &MigrateAccounts,
) -> Result<Instruction, StakingError> {
    Ok(Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(accounts.user, true),
            AccountMeta::new_readonly(accounts.legacy_user_stake, false),
            AccountMeta::new(accounts.user_stake, false),
            AccountMeta::new(accounts.config, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: instruction_data("migrate_account", &())?,
    })
}
