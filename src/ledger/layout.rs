//! Borsh layouts of the staking program accounts.
//!
//! Accounts follow the Anchor convention: an 8-byte discriminator
//! (`sha256("account:<Name>")[..8]`) followed by Borsh-encoded fields.
//! Decoders return `None` when the discriminator does not match, so the
//! version resolver can try the other layout.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::hash::hash;
use solana_sdk::pubkey::Pubkey;

use crate::domain::{LegacyPoolConfig, PoolConfig, SustainablePoolConfig, UserPosition};

/// Length of an Anchor discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Returns `sha256("<namespace>:<name>")[..8]`.
#[must_use]
pub fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = hash(format!("{namespace}:{name}").as_bytes()).to_bytes();
    let mut out = [0u8; DISCRIMINATOR_LEN];
    if let Some(head) = digest.first_chunk::<DISCRIMINATOR_LEN>() {
        out = *head;
    }
    out
}

/// An account type with a fixed Anchor name.
pub trait AnchorAccount: BorshDeserialize + BorshSerialize {
    /// Struct name hashed into the discriminator.
    const NAME: &'static str;

    /// Decodes `data` if its discriminator matches [`Self::NAME`].
    ///
    /// Trailing bytes after the fields (account padding) are ignored.
    fn decode(data: &[u8]) -> Option<Self> {
        let (head, mut body) = data.split_first_chunk::<DISCRIMINATOR_LEN>()?;
        if *head != discriminator("account", Self::NAME) {
            return None;
        }
        Self::deserialize(&mut body).ok()
    }

    /// Encodes the account with its discriminator.
    ///
    /// # Errors
    ///
    /// Propagates Borsh I/O errors.
    fn encode(&self) -> std::io::Result<Vec<u8>> {
        let mut out = discriminator("account", Self::NAME).to_vec();
        self.serialize(&mut out)?;
        Ok(out)
    }
}

/// Legacy pool configuration account.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakingConfigAccount {
    pub authority: [u8; 32],
    pub token_mint: [u8; 32],
    pub pool_vault: [u8; 32],
    pub total_deposit: u64,
    pub total_rate: u128,
    pub last_reward_time: i64,
    pub reward_multiplier: u64,
    pub claim_period: i64,
    pub bump: u8,
}

impl AnchorAccount for StakingConfigAccount {
    const NAME: &'static str = "StakingConfig";
}

impl From<StakingConfigAccount> for PoolConfig {
    fn from(a: StakingConfigAccount) -> Self {
        Self::Legacy(LegacyPoolConfig {
            token_mint: Pubkey::new_from_array(a.token_mint),
            pool_vault: Pubkey::new_from_array(a.pool_vault),
            total_deposit: a.total_deposit,
            total_rate: a.total_rate,
            last_reward_time: a.last_reward_time,
            reward_multiplier: a.reward_multiplier,
            claim_period: a.claim_period,
        })
    }
}

/// Sustainable pool configuration account.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SustainableConfigAccount {
    pub authority: [u8; 32],
    pub token_mint: [u8; 32],
    pub pool_vault: [u8; 32],
    pub reward_vault: [u8; 32],
    pub total_deposit: u64,
    pub total_rate: u128,
    pub last_reward_time: i64,
    pub current_reward_rate: u128,
    pub bump: u8,
}

impl AnchorAccount for SustainableConfigAccount {
    const NAME: &'static str = "SustainableConfig";
}

impl From<SustainableConfigAccount> for PoolConfig {
    fn from(a: SustainableConfigAccount) -> Self {
        Self::Sustainable(SustainablePoolConfig {
            token_mint: Pubkey::new_from_array(a.token_mint),
            pool_vault: Pubkey::new_from_array(a.pool_vault),
            reward_vault: Pubkey::new_from_array(a.reward_vault),
            total_deposit: a.total_deposit,
            total_rate: a.total_rate,
            last_reward_time: a.last_reward_time,
            current_reward_rate: a.current_reward_rate,
        })
    }
}

/// Legacy per-user stake account.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserStakeAccount {
    pub owner: [u8; 32],
    pub deposit: u64,
    pub debt: u128,
    pub last_update: i64,
    pub initialized: bool,
    pub bump: u8,
}

impl AnchorAccount for UserStakeAccount {
    const NAME: &'static str = "UserStake";
}

impl From<UserStakeAccount> for UserPosition {
    fn from(a: UserStakeAccount) -> Self {
        Self {
            deposit: a.deposit,
            debt: a.debt,
            last_update: a.last_update,
            initialized: a.initialized,
        }
    }
}

/// Sustainable per-user stake account.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UserStakeV2Account {
    pub owner: [u8; 32],
    pub deposit: u64,
    pub debt: u128,
    pub last_update: i64,
    pub initialized: bool,
    pub migrated: bool,
    pub bump: u8,
}

impl AnchorAccount for UserStakeV2Account {
    const NAME: &'static str = "UserStakeV2";
}

impl From<UserStakeV2Account> for UserPosition {
    fn from(a: UserStakeV2Account) -> Self {
        Self {
            deposit: a.deposit,
            debt: a.debt,
            last_update: a.last_update,
            initialized: a.initialized,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn legacy_config() -> StakingConfigAccount {
        StakingConfigAccount {
            authority: [1; 32],
            token_mint: [2; 32],
            pool_vault: [3; 32],
            total_deposit: 1_000,
            total_rate: 5_000_000_000_000,
            last_reward_time: 1_700_000_000,
            reward_multiplier: 10,
            claim_period: 86_400,
            bump: 254,
        }
    }

    #[test]
    fn discriminator_is_stable_and_namespaced() {
        let a = discriminator("account", "StakingConfig");
        assert_eq!(a, discriminator("account", "StakingConfig"));
        assert_ne!(a, discriminator("account", "SustainableConfig"));
        assert_ne!(a, discriminator("global", "StakingConfig"));
    }

    #[test]
    fn decode_ignores_trailing_padding() {
        let Ok(mut data) = legacy_config().encode() else {
            panic!("encode failed");
        };
        data.extend_from_slice(&[0u8; 64]);
        assert_eq!(StakingConfigAccount::decode(&data), Some(legacy_config()));
    }

    #[test]
    fn decode_rejects_foreign_discriminator() {
        let Ok(data) = legacy_config().encode() else {
            panic!("encode failed");
        };
        assert!(SustainableConfigAccount::decode(&data).is_none());
        assert!(UserStakeAccount::decode(&data).is_none());
    }

    #[test]
    fn decode_rejects_short_data() {
        assert!(StakingConfigAccount::decode(&[0u8; 4]).is_none());
        let head = discriminator("account", StakingConfigAccount::NAME);
        assert!(StakingConfigAccount::decode(&head).is_none());
    }

    #[test]
    fn legacy_config_maps_to_legacy_variant() {
        let config = PoolConfig::from(legacy_config());
        let PoolConfig::Legacy(inner) = config else {
            panic!("expected legacy variant");
        };
        assert_eq!(inner.total_deposit, 1_000);
        assert_eq!(inner.pool_vault, Pubkey::new_from_array([3; 32]));
    }
}
