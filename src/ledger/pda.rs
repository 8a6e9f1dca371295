//! Program-derived addresses of the staking programs.

use solana_sdk::pubkey::Pubkey;

/// Seed of the pool configuration account.
pub const CONFIG_SEED: &[u8] = b"config";

/// Seed prefix of per-user stake accounts.
pub const USER_SEED: &[u8] = b"user";

/// Seed of the PDA that owns the pool vaults.
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Pool configuration address under `program_id`.
#[must_use]
pub fn config_address(program_id: &Pubkey) -> Pubkey {
    let (config, _bump) = Pubkey::find_program_address(&[CONFIG_SEED], program_id);
    config
}

/// Stake account of `user` under `program_id`.
#[must_use]
pub fn user_stake_address(user: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (user_stake, _bump) =
        Pubkey::find_program_address(&[USER_SEED, user.as_ref()], program_id);
    user_stake
}

/// Vault authority under `program_id`.
#[must_use]
pub fn vault_authority_address(program_id: &Pubkey) -> Pubkey {
    let (authority, _bump) = Pubkey::find_program_address(&[VAULT_AUTHORITY_SEED], program_id);
    authority
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_differ_per_program_and_user() {
        let legacy = Pubkey::new_unique();
        let sustainable = Pubkey::new_unique();
        let user = Pubkey::new_unique();

        assert_ne!(config_address(&legacy), config_address(&sustainable));
        assert_ne!(
            user_stake_address(&user, &legacy),
            user_stake_address(&user, &sustainable)
        );
        assert_ne!(
            user_stake_address(&user, &legacy),
            user_stake_address(&Pubkey::new_unique(), &legacy)
        );
        assert_eq!(config_address(&legacy), config_address(&legacy));
    }

    #[test]
    fn derived_addresses_are_off_curve() {
        let program = Pubkey::new_unique();
        assert!(!vault_authority_address(&program).is_on_curve());
    }
}
