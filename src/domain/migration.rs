//! Migration credit: loyalty bonus plus reconciliation of historical
//! under-claiming, computed from the offline fairness snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fixed_point::{checked_add, pow10, scaled_mul};
use super::token_amount::parse_decimal_amount;
use crate::error::StakingError;

/// Fixed loyalty bonus in whole tokens.
pub const LOYALTY_BONUS_TOKENS: u64 = 100;

/// Claim reconciliation verdict from the fairness analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimStatus {
    /// Wallet claimed more than its fair share.
    OverClaimed,
    /// Wallet claimed less than its fair share.
    UnderClaimed,
    /// Wallet claimed exactly its fair share.
    CorrectlyClaimed,
}

/// Timeline aggregates for one wallet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StakingTimeline {
    /// Stake at analysis time, whole tokens.
    pub current_stake: f64,
    /// Total ever staked.
    pub total_staked: f64,
    /// Total ever unstaked.
    pub total_unstaked: f64,
    /// Total rewards claimed.
    pub total_rewards_claimed: f64,
    /// Number of staking events.
    pub activity_count: u64,
}

/// Fairness analysis of one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAnalysis {
    /// Rewards the wallet should have received.
    pub fair_rewards_tokens: f64,
    /// Rewards the wallet actually claimed.
    pub actual_claimed_tokens: f64,
    /// `fair - actual`, whole tokens.
    pub difference_tokens: f64,
    /// Reconciliation verdict.
    pub status: ClaimStatus,
    /// Timeline aggregates.
    #[serde(default)]
    pub timeline: StakingTimeline,
}

/// Immutable fairness snapshot keyed by lowercase wallet address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSnapshot {
    /// Artifact format version.
    #[serde(default)]
    pub version: u32,
    /// When the analysis was produced.
    #[serde(default)]
    pub generated_at: Option<String>,
    /// Per-wallet analysis.
    pub wallets: HashMap<String, WalletAnalysis>,
}

impl MigrationSnapshot {
    /// Parses the artifact and normalises wallet keys to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`StakingError::SnapshotUnavailable`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, StakingError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| StakingError::SnapshotUnavailable(e.to_string()))?;
        Ok(snapshot.normalized())
    }

    /// Returns the snapshot with every wallet key lowercased.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            wallets: self
                .wallets
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            ..self
        }
    }

    /// Case-insensitive wallet lookup.
    #[must_use]
    pub fn lookup(&self, wallet: &str) -> Option<&WalletAnalysis> {
        self.wallets.get(&wallet.to_lowercase())
    }
}

/// Migration credit in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardBreakdown {
    /// Loyalty bonus.
    pub loyalty_bonus: u64,
    /// Under-claimed rewards being made up.
    pub unclaimed_rewards: u64,
    /// `loyalty_bonus + unclaimed_rewards`.
    pub total_claimable: u64,
    /// Verdict for the wallet, `None` when it is absent from the snapshot.
    pub status: Option<ClaimStatus>,
}

/// Computes migration credits for a token with fixed decimals.
#[derive(Debug, Clone, Copy)]
pub struct MigrationRewardComputer {
    decimals: u8,
}

impl MigrationRewardComputer {
    /// Creates a computer for a token with `decimals` decimals.
    #[must_use]
    pub const fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    /// Computes the credit for a wallet's analysis, if any.
    ///
    /// Over-claimed and correctly-claimed wallets get the loyalty bonus
    /// only; the credit is never reduced below it. Conversion to base
    /// units floors, so the transfer never exceeds the computed credit.
    ///
    /// # Errors
    ///
    /// - [`StakingError::SnapshotUnavailable`] if the difference is not a
    ///   finite number.
    /// - [`StakingError::ArithmeticOverflow`] if the credit exceeds `u64`.
    pub fn compute(
        &self,
        analysis: Option<&WalletAnalysis>,
    ) -> Result<RewardBreakdown, StakingError> {
        let loyalty = scaled_mul(u128::from(LOYALTY_BONUS_TOKENS), pow10(self.decimals)?)?;
        let loyalty_bonus =
            u64::try_from(loyalty).map_err(|_| StakingError::ArithmeticOverflow)?;

        let unclaimed_rewards = match analysis {
            Some(a) if a.status == ClaimStatus::UnderClaimed => {
                self.tokens_to_base_units(a.difference_tokens.abs())?
            }
            _ => 0,
        };

        let total = checked_add(u128::from(loyalty_bonus), u128::from(unclaimed_rewards))?;
        let total_claimable = u64::try_from(total).map_err(|_| StakingError::ArithmeticOverflow)?;

        Ok(RewardBreakdown {
            loyalty_bonus,
            unclaimed_rewards,
            total_claimable,
            status: analysis.map(|a| a.status),
        })
    }

    /// Floors a whole-token float to base units via its decimal rendering.
    fn tokens_to_base_units(&self, tokens: f64) -> Result<u64, StakingError> {
        if !tokens.is_finite() {
            return Err(StakingError::SnapshotUnavailable(format!(
                "non-finite token amount: {tokens}"
            )));
        }
        parse_decimal_amount(&tokens.to_string(), self.decimals).map_err(|e| match e {
            StakingError::InvalidAmount(_) => StakingError::ArithmeticOverflow,
            other => other,
        })
    }
}
