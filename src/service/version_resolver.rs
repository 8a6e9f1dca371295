//! Determines which staking program layout is live.
//!
//! The sustainable program is probed first; the legacy program is the
//! fallback. The outcome depends only on ledger state, never on caller
//! hints.

use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;

use crate::domain::{PoolConfig, ProgramVersion, UserPosition};
use crate::error::StakingError;
use crate::ledger::LedgerClient;
use crate::ledger::layout::{
    AnchorAccount, StakingConfigAccount, SustainableConfigAccount, UserStakeAccount,
    UserStakeV2Account,
};
use crate::ledger::pda;

/// Program ids of both layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    /// Legacy staking program.
    pub legacy: Pubkey,
    /// Sustainable staking program.
    pub sustainable: Pubkey,
}

/// Outcome of version resolution for one wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Program id of the live layout.
    pub program_id: Pubkey,
    /// Pool configuration address under that program.
    pub config_address: Pubkey,
    /// The wallet's stake account address under that program.
    pub user_account_address: Pubkey,
    /// Decoded pool configuration.
    pub config: PoolConfig,
}

impl ResolvedVersion {
    /// Layout that was resolved.
    #[must_use]
    pub const fn version(&self) -> ProgramVersion {
        self.config.version()
    }

    /// `true` when the sustainable layout is live.
    #[must_use]
    pub const fn is_new_version(&self) -> bool {
        self.version().is_new_version()
    }
}

/// Resolves the active program layout and reads stake accounts through it.
#[derive(Debug, Clone, Copy)]
pub struct VersionResolver {
    programs: ProgramIds,
}

impl VersionResolver {
    /// Creates a resolver over the given program ids.
    #[must_use]
    pub const fn new(programs: ProgramIds) -> Self {
        Self { programs }
    }

    /// Program ids this resolver probes.
    #[must_use]
    pub const fn programs(&self) -> ProgramIds {
        self.programs
    }

    /// Resolves the live layout for `user`.
    ///
    /// # Errors
    ///
    /// - [`StakingError::PoolNotInitialized`] if neither configuration
    ///   account exists.
    /// - [`StakingError::VersionResolutionFailed`] if a configuration
    ///   account exists but matches neither layout.
    /// - [`StakingError::ExternalServiceError`] on ledger failure.
    pub async fn resolve(
        &self,
        ledger: &dyn LedgerClient,
        user: &Pubkey,
    ) -> Result<ResolvedVersion, StakingError> {
        let sustainable_config = pda::config_address(&self.programs.sustainable);
        let sustainable = ledger.get_account(&sustainable_config).await?;
        if let Some(config) = sustainable
            .as_ref()
            .and_then(|a| decode_owned::<SustainableConfigAccount>(a, &self.programs.sustainable))
        {
            return Ok(ResolvedVersion {
                program_id: self.programs.sustainable,
                config_address: sustainable_config,
                user_account_address: pda::user_stake_address(user, &self.programs.sustainable),
                config: config.into(),
            });
        }

        let legacy_config = pda::config_address(&self.programs.legacy);
        let legacy = ledger.get_account(&legacy_config).await?;
        if let Some(config) = legacy
            .as_ref()
            .and_then(|a| decode_owned::<StakingConfigAccount>(a, &self.programs.legacy))
        {
            return Ok(ResolvedVersion {
                program_id: self.programs.legacy,
                config_address: legacy_config,
                user_account_address: pda::user_stake_address(user, &self.programs.legacy),
                config: config.into(),
            });
        }

        match (sustainable, legacy) {
            (None, None) => Err(StakingError::PoolNotInitialized),
            (Some(_), _) => Err(StakingError::VersionResolutionFailed(format!(
                "config account {sustainable_config} matches neither layout"
            ))),
            (None, Some(_)) => Err(StakingError::VersionResolutionFailed(format!(
                "config account {legacy_config} matches neither layout"
            ))),
        }
    }

    /// Reads the wallet's stake account under the resolved layout.
    ///
    /// `Ok(None)` means the wallet never staked with this program.
    ///
    /// # Errors
    ///
    /// - [`StakingError::VersionResolutionFailed`] if the account exists but
    ///   does not decode under the resolved layout.
    /// - [`StakingError::ExternalServiceError`] on ledger failure.
    pub async fn load_user(
        &self,
        ledger: &dyn LedgerClient,
        resolved: &ResolvedVersion,
    ) -> Result<Option<UserPosition>, StakingError> {
        let Some(account) = ledger.get_account(&resolved.user_account_address).await? else {
            return Ok(None);
        };

        let position = match resolved.version() {
            ProgramVersion::Sustainable => {
                decode_owned::<UserStakeV2Account>(&account, &resolved.program_id)
                    .map(UserPosition::from)
            }
            ProgramVersion::Legacy => {
                decode_owned::<UserStakeAccount>(&account, &resolved.program_id)
                    .map(UserPosition::from)
            }
        };

        position.map(Some).ok_or_else(|| {
            StakingError::VersionResolutionFailed(format!(
                "stake account {} does not match the {} layout",
                resolved.user_account_address,
                resolved.version()
            ))
        })
    }
}

/// Decodes `account` as `T` if it is owned by `program_id`.
fn decode_owned<T: AnchorAccount>(account: &Account, program_id: &Pubkey) -> Option<T> {
    if account.owner != *program_id {
        return None;
    }
    T::decode(&account.data)
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;

    pub(crate) fn sustainable_config(rate: u128) -> SustainableConfigAccount {
        SustainableConfigAccount {
            authority: [1; 32],
            token_mint: [2; 32],
            pool_vault: [3; 32],
            reward_vault: [4; 32],
            total_deposit: 1_000_000_000_000,
            total_rate: 0,
            last_reward_time: 1_700_000_000,
            current_reward_rate: rate,
            bump: 255,
        }
    }

    pub(crate) fn legacy_config() -> StakingConfigAccount {
        StakingConfigAccount {
            authority: [1; 32],
            token_mint: [2; 32],
            pool_vault: [3; 32],
            total_deposit: 1_000,
            total_rate: 0,
            last_reward_time: 1_700_000_000,
            reward_multiplier: 1_000_000,
            claim_period: 86_400,
            bump: 255,
        }
    }

    fn programs() -> ProgramIds {
        ProgramIds {
            legacy: Pubkey::new_unique(),
            sustainable: Pubkey::new_unique(),
        }
    }

    fn put<T: AnchorAccount>(ledger: &InMemoryLedger, address: Pubkey, owner: Pubkey, value: &T) {
        let Ok(data) = value.encode() else {
            panic!("encode failed");
        };
        ledger.insert(address, owner, data);
    }

    #[tokio::test]
    async fn prefers_sustainable_layout() {
        let ids = programs();
        let ledger = InMemoryLedger::new();
        put(
            &ledger,
            pda::config_address(&ids.sustainable),
            ids.sustainable,
            &sustainable_config(5),
        );
        put(&ledger, pda::config_address(&ids.legacy), ids.legacy, &legacy_config());

        let user = Pubkey::new_unique();
        let Ok(resolved) = VersionResolver::new(ids).resolve(&ledger, &user).await else {
            panic!("resolution failed");
        };
        assert!(resolved.is_new_version());
        assert_eq!(resolved.program_id, ids.sustainable);
        assert_eq!(
            resolved.user_account_address,
            pda::user_stake_address(&user, &ids.sustainable)
        );
    }

    #[tokio::test]
    async fn falls_back_to_legacy() {
        let ids = programs();
        let ledger = InMemoryLedger::new();
        put(&ledger, pda::config_address(&ids.legacy), ids.legacy, &legacy_config());

        let Ok(resolved) = VersionResolver::new(ids)
            .resolve(&ledger, &Pubkey::new_unique())
            .await
        else {
            panic!("resolution failed");
        };
        assert_eq!(resolved.version(), ProgramVersion::Legacy);
        assert_eq!(resolved.config_address, pda::config_address(&ids.legacy));
    }

    #[tokio::test]
    async fn missing_pool_is_not_initialized() {
        let ledger = InMemoryLedger::new();
        let result = VersionResolver::new(programs())
            .resolve(&ledger, &Pubkey::new_unique())
            .await;
        let Err(StakingError::PoolNotInitialized) = result else {
            panic!("expected PoolNotInitialized");
        };
    }

    #[tokio::test]
    async fn undecodable_config_fails_resolution() {
        let ids = programs();
        let ledger = InMemoryLedger::new();
        ledger.insert(pda::config_address(&ids.sustainable), ids.sustainable, vec![0u8; 16]);

        let result = VersionResolver::new(ids)
            .resolve(&ledger, &Pubkey::new_unique())
            .await;
        let Err(StakingError::VersionResolutionFailed(_)) = result else {
            panic!("expected VersionResolutionFailed");
        };
    }

    #[tokio::test]
    async fn foreign_owner_is_ignored() {
        let ids = programs();
        let ledger = InMemoryLedger::new();
        put(
            &ledger,
            pda::config_address(&ids.sustainable),
            Pubkey::new_unique(),
            &sustainable_config(5),
        );
        put(&ledger, pda::config_address(&ids.legacy), ids.legacy, &legacy_config());

        let Ok(resolved) = VersionResolver::new(ids)
            .resolve(&ledger, &Pubkey::new_unique())
            .await
        else {
            panic!("resolution failed");
        };
        assert_eq!(resolved.version(), ProgramVersion::Legacy);
    }

    #[tokio::test]
    async fn load_user_reads_resolved_layout() {
        let ids = programs();
        let ledger = InMemoryLedger::new();
        put(&ledger, pda::config_address(&ids.legacy), ids.legacy, &legacy_config());
        let user = Pubkey::new_unique();
        let resolver = VersionResolver::new(ids);
        let Ok(resolved) = resolver.resolve(&ledger, &user).await else {
            panic!("resolution failed");
        };

        let Ok(None) = resolver.load_user(&ledger, &resolved).await else {
            panic!("expected no stake account");
        };

        put(
            &ledger,
            resolved.user_account_address,
            ids.legacy,
            &UserStakeAccount {
                owner: user.to_bytes(),
                deposit: 250,
                debt: 10,
                last_update: 1_700_000_000,
                initialized: true,
                bump: 254,
            },
        );
        let Ok(Some(position)) = resolver.load_user(&ledger, &resolved).await else {
            panic!("expected stake account");
        };
        assert_eq!(position.deposit, 250);
        assert_eq!(position.debt, 10);
    }

    #[tokio::test]
    async fn load_user_rejects_wrong_layout() {
        let ids = programs();
        let ledger = InMemoryLedger::new();
        put(
            &ledger,
            pda::config_address(&ids.sustainable),
            ids.sustainable,
            &sustainable_config(1),
        );
        let user = Pubkey::new_unique();
        let resolver = VersionResolver::new(ids);
        let Ok(resolved) = resolver.resolve(&ledger, &user).await else {
            panic!("resolution failed");
        };
        put(
            &ledger,
            resolved.user_account_address,
            ids.sustainable,
            &UserStakeAccount {
                owner: user.to_bytes(),
                deposit: 1,
                debt: 0,
                last_update: 0,
                initialized: true,
                bump: 1,
            },
        );
        let Err(StakingError::VersionResolutionFailed(_)) =
            resolver.load_user(&ledger, &resolved).await
        else {
            panic!("expected layout mismatch");
        };
    }
}
