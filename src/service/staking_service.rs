//! Staking service: orchestrates ledger reads, accrual, and transaction
//! builds for one wallet per call.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use super::version_resolver::{ProgramIds, ResolvedVersion, VersionResolver};
use crate::config::CustodialAuthority;
use crate::domain::{
    AccrualResult, MathError, MigrationRewardComputer, RewardAccrualCalculator, RewardBreakdown,
};
use crate::error::StakingError;
use crate::ledger::LedgerClient;
use crate::snapshot::SnapshotStore;
use crate::tx::unstake::UnstakeParams;
use crate::tx::{BuiltTransaction, MigrationTransactionBuilder, UnstakeTransactionBuilder};

/// Accrual view of one wallet.
#[derive(Debug, Clone)]
pub struct UserInfo {
    /// Live program layout and pool configuration.
    pub resolved: ResolvedVersion,
    /// Accrual at request time.
    pub accrual: AccrualResult,
}

/// Pool-wide view, independent of any wallet.
#[derive(Debug, Clone)]
pub struct PoolOverview {
    /// Live program layout and pool configuration.
    pub resolved: ResolvedVersion,
    /// Accumulator extrapolated to request time.
    pub acc_per_share: u128,
    /// Pool-wide tokens per second (display only).
    pub global_rate: f64,
}

/// A migration transaction with the credit it transfers.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    /// Partially-signed transaction.
    pub transaction: BuiltTransaction,
    /// Credit breakdown in base units.
    pub breakdown: RewardBreakdown,
}

/// Orchestration layer for all staking operations.
///
/// Stateless coordinator: every call reads fresh ledger and snapshot state,
/// computes synchronously, and returns. Nothing is written anywhere.
#[derive(Debug, Clone)]
pub struct StakingService {
    ledger: Arc<dyn LedgerClient>,
    snapshots: Arc<dyn SnapshotStore>,
    resolver: VersionResolver,
    token_mint: Pubkey,
    token_decimals: u8,
    calculator: RewardAccrualCalculator,
    unstake_builder: UnstakeTransactionBuilder,
    migration_builder: MigrationTransactionBuilder,
    migration_rewards: MigrationRewardComputer,
    custodial: CustodialAuthority,
}

impl StakingService {
    /// Creates a new `StakingService`.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        snapshots: Arc<dyn SnapshotStore>,
        programs: ProgramIds,
        token_mint: Pubkey,
        token_decimals: u8,
        custodial: CustodialAuthority,
    ) -> Self {
        Self {
            ledger,
            snapshots,
            resolver: VersionResolver::new(programs),
            token_mint,
            token_decimals,
            calculator: RewardAccrualCalculator::new(token_decimals),
            unstake_builder: UnstakeTransactionBuilder::new(token_decimals),
            migration_builder: MigrationTransactionBuilder::new(
                programs,
                token_mint,
                token_decimals,
            ),
            migration_rewards: MigrationRewardComputer::new(token_decimals),
            custodial,
        }
    }

    /// Program ids probed during version resolution.
    #[must_use]
    pub const fn programs(&self) -> ProgramIds {
        self.resolver.programs()
    }

    /// Staked and reward token mint.
    #[must_use]
    pub const fn token_mint(&self) -> Pubkey {
        self.token_mint
    }

    /// Token decimal count used for display formatting.
    #[must_use]
    pub const fn token_decimals(&self) -> u8 {
        self.token_decimals
    }

    /// Computes the wallet's accrual against the live pool.
    ///
    /// A wallet that never staked gets a zero accrual, not an error.
    ///
    /// # Errors
    ///
    /// - [`StakingError::InvalidAddress`] for a malformed wallet.
    /// - [`StakingError::PoolNotInitialized`] or
    ///   [`StakingError::VersionResolutionFailed`] from resolution.
    /// - [`StakingError::ArithmeticOverflow`] if accrual overflows.
    /// - [`StakingError::ExternalServiceError`] on ledger failure.
    pub async fn get_user_info(&self, wallet: &str) -> Result<UserInfo, StakingError> {
        let user = parse_wallet(wallet)?;
        let resolved = self.resolver.resolve(self.ledger.as_ref(), &user).await?;
        let position = self.resolver.load_user(self.ledger.as_ref(), &resolved).await?;

        let now = Utc::now().timestamp();
        let accrual = self
            .calculator
            .compute(&resolved.config, position.as_ref(), now)
            .map_err(|e| math_failure(&user, e))?;

        tracing::debug!(
            wallet = %user,
            version = %resolved.version(),
            claimable = %accrual.claimable_amount,
            "computed user accrual"
        );

        Ok(UserInfo { resolved, accrual })
    }

    /// Reports the live pool layout and its accumulator at request time.
    ///
    /// # Errors
    ///
    /// Same resolution and arithmetic errors as [`Self::get_user_info`].
    pub async fn pool_info(&self) -> Result<PoolOverview, StakingError> {
        // The user account address is unused here; any key resolves the pool.
        let resolved = self
            .resolver
            .resolve(self.ledger.as_ref(), &Pubkey::default())
            .await?;

        let now = Utc::now().timestamp();
        let (_, _, acc_per_share) = self
            .calculator
            .accumulator_at(&resolved.config, now)
            .map_err(|e| math_failure(&resolved.config_address, e))?;
        let global_rate = self.calculator.global_rate(&resolved.config);

        Ok(PoolOverview {
            resolved,
            acc_per_share,
            global_rate,
        })
    }

    /// Builds an unsigned withdrawal of `amount` tokens.
    ///
    /// Wallet and amount are validated before any ledger access.
    ///
    /// # Errors
    ///
    /// - [`StakingError::InvalidAddress`] for a malformed wallet.
    /// - [`StakingError::InvalidAmount`] for a malformed or zero amount, or
    ///   one exceeding the wallet's deposit.
    /// - Resolution, build, and ledger errors as documented on
    ///   [`StakingError`].
    pub async fn build_unstake_transaction(
        &self,
        wallet: &str,
        amount: &str,
    ) -> Result<BuiltTransaction, StakingError> {
        let user = parse_wallet(wallet)?;
        let base_units = self.unstake_builder.parse_amount(amount)?;

        let resolved = self.resolver.resolve(self.ledger.as_ref(), &user).await?;
        let deposit = self
            .resolver
            .load_user(self.ledger.as_ref(), &resolved)
            .await?
            .filter(|p| p.initialized)
            .map_or(0, |p| p.deposit);
        if base_units > deposit {
            return Err(StakingError::InvalidAmount(format!(
                "{amount} exceeds staked balance"
            )));
        }

        let user_token = get_associated_token_address(&user, &resolved.config.token_mint());
        let user_token_account_exists = self.ledger.get_account(&user_token).await?.is_some();
        let recent_blockhash = self.ledger.latest_blockhash().await?;

        let built = self.unstake_builder.build(&UnstakeParams {
            resolved: &resolved,
            amount,
            user_wallet: user,
            user_token_account_exists,
            recent_blockhash,
        })?;

        tracing::info!(
            wallet = %user,
            version = %resolved.version(),
            amount = base_units,
            "built unstake transaction"
        );
        Ok(built)
    }

    /// Computes the wallet's migration credit without building anything.
    ///
    /// # Errors
    ///
    /// - [`StakingError::InvalidAddress`] for a malformed wallet.
    /// - [`StakingError::SnapshotUnavailable`] if the snapshot cannot be
    ///   loaded.
    pub async fn preview_migration(&self, wallet: &str) -> Result<RewardBreakdown, StakingError> {
        let user = parse_wallet(wallet)?;
        self.migration_breakdown(&user).await
    }

    /// Builds the one-time migration transaction, partially signed by the
    /// custodial authority.
    ///
    /// # Errors
    ///
    /// - [`StakingError::InvalidAddress`] for a malformed wallet, before any
    ///   ledger or snapshot access.
    /// - [`StakingError::SnapshotUnavailable`] if the snapshot cannot be
    ///   loaded.
    /// - [`StakingError::TransactionBuildFailed`] if signing fails.
    /// - [`StakingError::ExternalServiceError`] on ledger failure.
    pub async fn build_migration_transaction(
        &self,
        wallet: &str,
    ) -> Result<MigrationOutcome, StakingError> {
        let user = parse_wallet(wallet)?;
        let breakdown = self.migration_breakdown(&user).await?;

        let destination = self.migration_builder.destination(&user);
        let destination_exists = self.ledger.get_account(&destination).await?.is_some();
        let recent_blockhash = self.ledger.latest_blockhash().await?;

        let transaction = self.migration_builder.build(
            user,
            self.custodial.keypair(),
            breakdown.total_claimable,
            destination_exists,
            recent_blockhash,
        )?;

        tracing::info!(
            wallet = %user,
            amount = breakdown.total_claimable,
            status = ?breakdown.status,
            "built migration transaction"
        );
        Ok(MigrationOutcome {
            transaction,
            breakdown,
        })
    }

    async fn migration_breakdown(&self, user: &Pubkey) -> Result<RewardBreakdown, StakingError> {
        let snapshot = self.snapshots.load().await?;
        let analysis = snapshot.lookup(&user.to_string());
        if analysis.is_none() {
            tracing::debug!(wallet = %user, "wallet not in migration snapshot");
        }
        self.migration_rewards.compute(analysis)
    }
}

/// Parses a base58 wallet address.
fn parse_wallet(wallet: &str) -> Result<Pubkey, StakingError> {
    Pubkey::from_str(wallet.trim())
        .map_err(|_| StakingError::InvalidAddress(wallet.to_string()))
}

fn math_failure(subject: &Pubkey, error: MathError) -> StakingError {
    tracing::error!(subject = %subject, error = %error, "reward arithmetic failed");
    StakingError::from(error)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use solana_sdk::signature::Keypair;

    use super::*;
    use crate::domain::{ClaimStatus, MigrationSnapshot, SystemType, WalletAnalysis};
    use crate::ledger::InMemoryLedger;
    use crate::ledger::layout::{AnchorAccount, UserStakeV2Account};
    use crate::ledger::pda;
    use crate::service::version_resolver::tests::sustainable_config;
    use crate::snapshot::InMemorySnapshotStore;
    use crate::tx::TransactionState;

    struct Fixture {
        ledger: Arc<InMemoryLedger>,
        programs: ProgramIds,
        service: StakingService,
    }

    fn fixture(snapshot: MigrationSnapshot) -> Fixture {
        let ledger = Arc::new(InMemoryLedger::new());
        let programs = ProgramIds {
            legacy: Pubkey::new_unique(),
            sustainable: Pubkey::new_unique(),
        };
        let Ok(config) = sustainable_config(0).encode() else {
            panic!("encode failed");
        };
        ledger.insert(
            pda::config_address(&programs.sustainable),
            programs.sustainable,
            config,
        );
        let service = StakingService::new(
            Arc::clone(&ledger) as Arc<dyn LedgerClient>,
            Arc::new(InMemorySnapshotStore::new(snapshot)),
            programs,
            Pubkey::new_from_array([2; 32]),
            6,
            CustodialAuthority::new(Keypair::new()),
        );
        Fixture {
            ledger,
            programs,
            service,
        }
    }

    fn stake(f: &Fixture, user: &Pubkey, deposit: u64) {
        let account = UserStakeV2Account {
            owner: user.to_bytes(),
            deposit,
            debt: 0,
            last_update: 1_700_000_000,
            initialized: true,
            migrated: false,
            bump: 255,
        };
        let Ok(data) = account.encode() else {
            panic!("encode failed");
        };
        f.ledger.insert(
            pda::user_stake_address(user, &f.programs.sustainable),
            f.programs.sustainable,
            data,
        );
    }

    #[tokio::test]
    async fn never_staked_wallet_gets_zero_result() {
        let f = fixture(MigrationSnapshot::default());
        let wallet = Pubkey::new_unique().to_string();
        let Ok(info) = f.service.get_user_info(&wallet).await else {
            panic!("user info failed");
        };
        assert_eq!(info.accrual.system_type, SystemType::Unknown);
        assert_eq!(info.accrual.claimable_amount, 0);
        assert!(info.resolved.is_new_version());
    }

    #[tokio::test]
    async fn staked_wallet_reports_share() {
        let f = fixture(MigrationSnapshot::default());
        let user = Pubkey::new_unique();
        stake(&f, &user, 250_000_000_000);
        let Ok(info) = f.service.get_user_info(&user.to_string()).await else {
            panic!("user info failed");
        };
        assert_eq!(info.accrual.user_deposit, 250_000_000_000);
        assert_eq!(info.accrual.user_share_bps, 2_500);
        assert!(!info.accrual.earning_rates.can_earn_rewards);
    }

    #[tokio::test]
    async fn malformed_wallet_fails_before_ledger_access() {
        let service = StakingService::new(
            Arc::new(InMemoryLedger::unavailable()),
            Arc::new(InMemorySnapshotStore::default()),
            ProgramIds {
                legacy: Pubkey::new_unique(),
                sustainable: Pubkey::new_unique(),
            },
            Pubkey::new_unique(),
            6,
            CustodialAuthority::new(Keypair::new()),
        );
        let Err(StakingError::InvalidAddress(_)) = service.get_user_info("not-a-wallet").await
        else {
            panic!("expected InvalidAddress");
        };
        let Err(StakingError::InvalidAddress(_)) =
            service.build_migration_transaction("0xdeadbeef").await
        else {
            panic!("expected InvalidAddress");
        };
        let Err(StakingError::InvalidAmount(_)) = service
            .build_unstake_transaction(&Pubkey::new_unique().to_string(), "0")
            .await
        else {
            panic!("expected InvalidAmount");
        };
    }

    #[tokio::test]
    async fn unstake_within_deposit_is_built() {
        let f = fixture(MigrationSnapshot::default());
        let user = Pubkey::new_unique();
        stake(&f, &user, 50_000_000);
        let Ok(built) = f
            .service
            .build_unstake_transaction(&user.to_string(), "12.5")
            .await
        else {
            panic!("unstake failed");
        };
        assert_eq!(built.state(), TransactionState::Built);
        assert_eq!(built.transaction().message.recent_blockhash, f.ledger.blockhash());
        // Token account is missing, so it is created first.
        assert_eq!(built.transaction().message.instructions.len(), 2);
    }

    #[tokio::test]
    async fn unstake_above_deposit_is_rejected() {
        let f = fixture(MigrationSnapshot::default());
        let user = Pubkey::new_unique();
        stake(&f, &user, 1_000_000);
        let Err(StakingError::InvalidAmount(_)) = f
            .service
            .build_unstake_transaction(&user.to_string(), "1.000001")
            .await
        else {
            panic!("expected InvalidAmount");
        };
    }

    #[tokio::test]
    async fn unstake_without_pool_is_not_initialized() {
        let service = StakingService::new(
            Arc::new(InMemoryLedger::new()),
            Arc::new(InMemorySnapshotStore::default()),
            ProgramIds {
                legacy: Pubkey::new_unique(),
                sustainable: Pubkey::new_unique(),
            },
            Pubkey::new_unique(),
            6,
            CustodialAuthority::new(Keypair::new()),
        );
        let Err(StakingError::PoolNotInitialized) = service
            .build_unstake_transaction(&Pubkey::new_unique().to_string(), "1")
            .await
        else {
            panic!("expected PoolNotInitialized");
        };
    }

    #[tokio::test]
    async fn migration_credits_under_claimed_wallet() {
        let user = Pubkey::new_unique();
        let mut wallets = HashMap::new();
        wallets.insert(
            user.to_string(),
            WalletAnalysis {
                fair_rewards_tokens: 50.0,
                actual_claimed_tokens: 24.5,
                difference_tokens: 25.5,
                status: ClaimStatus::UnderClaimed,
                timeline: Default::default(),
            },
        );
        let f = fixture(MigrationSnapshot {
            wallets,
            ..MigrationSnapshot::default()
        });

        let Ok(outcome) = f.service.build_migration_transaction(&user.to_string()).await else {
            panic!("migration failed");
        };
        assert_eq!(outcome.breakdown.total_claimable, 125_500_000);
        assert_eq!(outcome.breakdown.status, Some(ClaimStatus::UnderClaimed));
        assert_eq!(
            outcome.transaction.state(),
            TransactionState::PartiallySigned
        );
    }

    #[tokio::test]
    async fn migration_skips_existing_destination() {
        let f = fixture(MigrationSnapshot::default());
        let user = Pubkey::new_unique();
        let destination = get_associated_token_address(&user, &Pubkey::new_from_array([2; 32]));
        f.ledger.insert(destination, spl_token::id(), vec![0; 165]);

        let Ok(outcome) = f.service.build_migration_transaction(&user.to_string()).await else {
            panic!("migration failed");
        };
        assert_eq!(outcome.breakdown.total_claimable, 100_000_000);
        assert_eq!(outcome.breakdown.status, None);
        assert_eq!(outcome.transaction.transaction().message.instructions.len(), 2);
    }

    #[tokio::test]
    async fn preview_matches_execute_breakdown() {
        let f = fixture(MigrationSnapshot::default());
        let wallet = Pubkey::new_unique().to_string();
        let Ok(preview) = f.service.preview_migration(&wallet).await else {
            panic!("preview failed");
        };
        let Ok(outcome) = f.service.build_migration_transaction(&wallet).await else {
            panic!("migration failed");
        };
        assert_eq!(preview, outcome.breakdown);
    }

    #[tokio::test]
    async fn pool_info_reports_sustainable_layout() {
        let f = fixture(MigrationSnapshot::default());
        let Ok(pool) = f.service.pool_info().await else {
            panic!("pool info failed");
        };
        assert!(pool.resolved.is_new_version());
        assert_eq!(pool.resolved.config.total_deposit(), 1_000_000_000_000);
        assert_eq!(pool.acc_per_share, 0);
    }
}
