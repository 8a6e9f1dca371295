//! Staking DTOs for user info, unstake, migration, and pool endpoints.
//!
//! Field names are camelCase. Token amounts carry 6 fractional digits,
//! rates 9, percentages 8; raw integers are plain decimal strings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::token_amount::{
    AMOUNT_DISPLAY_PLACES, PERCENT_DISPLAY_PLACES, RATE_DISPLAY_PLACES, format_raw_amount,
    format_rate,
};
use crate::domain::{ClaimStatus, EarningRates, ProgramVersion, RewardBreakdown, SystemType};
use crate::service::staking_service::{PoolOverview, UserInfo};
use crate::tx::TransactionState;

/// Display-only earning rates.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarningRatesDto {
    /// Tokens per second.
    pub per_second: String,
    /// Tokens per hour.
    pub per_hour: String,
    /// Tokens per day.
    pub per_day: String,
    /// User has a deposit and the pool pays a positive rate.
    pub can_earn_rewards: bool,
}

impl From<&EarningRates> for EarningRatesDto {
    fn from(rates: &EarningRates) -> Self {
        Self {
            per_second: format_rate(rates.per_second, RATE_DISPLAY_PLACES),
            per_hour: format_rate(rates.per_hour, RATE_DISPLAY_PLACES),
            per_day: format_rate(rates.per_day, RATE_DISPLAY_PLACES),
            can_earn_rewards: rates.can_earn_rewards,
        }
    }
}

/// Response body for `GET /staking/user-info/{wallet}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    /// Staked balance, whole tokens.
    pub user_deposit: String,
    /// Claimable rewards, whole tokens.
    pub rewards: String,
    /// Pool-wide stake, whole tokens.
    pub total_deposit: String,
    /// Reward model in effect for this wallet.
    pub system_type: SystemType,
    /// Wallet's share of the pool rate, tokens per second.
    pub effective_reward_rate: String,
    /// Derived earning rates.
    pub earning_rates: EarningRatesDto,
    /// Share of the pool, percent.
    pub user_share_percentage: String,
    /// `true` when the sustainable layout is live.
    pub is_new_version: bool,
    /// Staked balance, base units.
    pub raw_deposit: String,
    /// Debt baseline.
    pub raw_debt: String,
    /// Accumulator at request time.
    pub acc_per_share: String,
    /// `deposit * accPerShare / PRECISION`, base units.
    pub raw_rewards: String,
}

impl UserInfoResponse {
    /// Renders a service view for a token with `decimals` decimals.
    #[must_use]
    pub fn from_view(info: &UserInfo, decimals: u8) -> Self {
        let accrual = &info.accrual;
        Self {
            user_deposit: format_raw_amount(
                u128::from(accrual.user_deposit),
                decimals,
                AMOUNT_DISPLAY_PLACES,
            ),
            rewards: format_raw_amount(accrual.claimable_amount, decimals, AMOUNT_DISPLAY_PLACES),
            total_deposit: format_raw_amount(
                u128::from(info.resolved.config.total_deposit()),
                decimals,
                AMOUNT_DISPLAY_PLACES,
            ),
            system_type: accrual.system_type,
            effective_reward_rate: format_rate(accrual.user_reward_rate, RATE_DISPLAY_PLACES),
            earning_rates: EarningRatesDto::from(&accrual.earning_rates),
            user_share_percentage: format_raw_amount(
                accrual.user_share_bps,
                2,
                PERCENT_DISPLAY_PLACES,
            ),
            is_new_version: info.resolved.is_new_version(),
            raw_deposit: accrual.user_deposit.to_string(),
            raw_debt: accrual.user_debt.to_string(),
            acc_per_share: accrual.acc_per_share.to_string(),
            raw_rewards: accrual.raw_rewards.to_string(),
        }
    }
}

/// Request body for `POST /staking/unstake`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnstakeRequest {
    /// Staker wallet, base58.
    pub wallet_address: String,
    /// Amount in whole tokens, e.g. `"12.5"`.
    pub amount: String,
}

/// Response body for `POST /staking/unstake`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnstakeResponse {
    /// Wire-format transaction, base64.
    pub serialized_transaction_base64: String,
    /// Signing state of the transaction.
    pub state: TransactionState,
}

/// Request body for `POST /staking/migration/execute`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    /// Staker wallet, base58.
    pub wallet_address: String,
}

/// Migration credit in whole tokens.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardBreakdownDto {
    /// Fixed loyalty bonus.
    pub loyalty_bonus: String,
    /// Under-claimed rewards being made up.
    pub unclaimed_rewards: String,
    /// Total transferred.
    #[serde(rename = "totalSSE")]
    pub total_sse: String,
    /// Snapshot verdict, `null` for wallets not in the snapshot.
    pub status: Option<ClaimStatus>,
}

impl RewardBreakdownDto {
    /// Renders a breakdown for a token with `decimals` decimals.
    #[must_use]
    pub fn from_breakdown(breakdown: &RewardBreakdown, decimals: u8) -> Self {
        let tokens =
            |raw: u64| format_raw_amount(u128::from(raw), decimals, AMOUNT_DISPLAY_PLACES);
        Self {
            loyalty_bonus: tokens(breakdown.loyalty_bonus),
            unclaimed_rewards: tokens(breakdown.unclaimed_rewards),
            total_sse: tokens(breakdown.total_claimable),
            status: breakdown.status,
        }
    }
}

/// Response body for `POST /staking/migration/execute`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResponse {
    /// Wire-format transaction, base64, carrying the custodial signature.
    pub serialized_transaction_base64: String,
    /// Signing state of the transaction.
    pub state: TransactionState,
    /// Human-readable summary.
    pub message: String,
    /// Credit breakdown.
    pub reward_breakdown: RewardBreakdownDto,
}

/// Response body for `GET /staking/migration/{wallet}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPreviewResponse {
    /// Staker wallet, base58.
    pub wallet_address: String,
    /// Credit breakdown.
    pub reward_breakdown: RewardBreakdownDto,
}

/// Response body for `GET /staking/pool`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfoResponse {
    /// Live program layout.
    pub version: ProgramVersion,
    /// `true` when the sustainable layout is live.
    pub is_new_version: bool,
    /// Program id of the live layout.
    pub program_id: String,
    /// Pool configuration address.
    pub config_address: String,
    /// Staked token mint.
    pub token_mint: String,
    /// Pool-wide stake, whole tokens.
    pub total_deposit: String,
    /// Reward model in effect.
    pub system_type: SystemType,
    /// Pool rate, tokens per second.
    pub global_reward_rate: String,
    /// Accumulator at request time.
    pub acc_per_share: String,
    /// Last accumulator update, unix seconds.
    pub last_reward_time: i64,
}

impl PoolInfoResponse {
    /// Renders a pool view for a token with `decimals` decimals.
    #[must_use]
    pub fn from_view(pool: &PoolOverview, decimals: u8) -> Self {
        let config = &pool.resolved.config;
        Self {
            version: pool.resolved.version(),
            is_new_version: pool.resolved.is_new_version(),
            program_id: pool.resolved.program_id.to_string(),
            config_address: pool.resolved.config_address.to_string(),
            token_mint: config.token_mint().to_string(),
            total_deposit: format_raw_amount(
                u128::from(config.total_deposit()),
                decimals,
                AMOUNT_DISPLAY_PLACES,
            ),
            system_type: config.system_type(),
            global_reward_rate: format_rate(pool.global_rate, RATE_DISPLAY_PLACES),
            acc_per_share: pool.acc_per_share.to_string(),
            last_reward_time: config.last_reward_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccrualResult, LegacyPoolConfig, PoolConfig};
    use crate::service::ResolvedVersion;
    use solana_sdk::pubkey::Pubkey;

    fn resolved() -> ResolvedVersion {
        ResolvedVersion {
            program_id: Pubkey::new_unique(),
            config_address: Pubkey::new_unique(),
            user_account_address: Pubkey::new_unique(),
            config: PoolConfig::Legacy(LegacyPoolConfig {
                token_mint: Pubkey::new_unique(),
                pool_vault: Pubkey::new_unique(),
                total_deposit: 1_000,
                total_rate: 0,
                last_reward_time: 0,
                reward_multiplier: 0,
                claim_period: 0,
            }),
        }
    }

    #[test]
    fn share_percentage_uses_basis_points() {
        let info = UserInfo {
            resolved: resolved(),
            accrual: AccrualResult {
                user_deposit: 250,
                user_share_bps: 2_500,
                ..AccrualResult::empty()
            },
        };
        let dto = UserInfoResponse::from_view(&info, 6);
        assert_eq!(dto.user_share_percentage, "25.00000000");
        assert_eq!(dto.user_deposit, "0.000250");
        assert_eq!(dto.total_deposit, "0.001000");
        assert_eq!(dto.raw_deposit, "250");
        assert!(!dto.is_new_version);
    }

    #[test]
    fn breakdown_serializes_total_sse() {
        let dto = RewardBreakdownDto::from_breakdown(
            &RewardBreakdown {
                loyalty_bonus: 100_000_000,
                unclaimed_rewards: 25_500_000,
                total_claimable: 125_500_000,
                status: Some(ClaimStatus::UnderClaimed),
            },
            6,
        );
        let json = serde_json::to_value(&dto).ok();
        let total = json.as_ref().and_then(|v| v.get("totalSSE")).and_then(|v| v.as_str());
        assert_eq!(total, Some("125.500000"));
        let status = json.as_ref().and_then(|v| v.get("status")).and_then(|v| v.as_str());
        assert_eq!(status, Some("under-claimed"));
    }

    #[test]
    fn empty_accrual_renders_zeroes() {
        let info = UserInfo {
            resolved: resolved(),
            accrual: AccrualResult::empty(),
        };
        let dto = UserInfoResponse::from_view(&info, 6);
        assert_eq!(dto.rewards, "0.000000");
        assert_eq!(dto.effective_reward_rate, "0.000000000");
        assert_eq!(dto.earning_rates.per_day, "0.000000000");
        assert_eq!(dto.system_type, SystemType::Unknown);
    }
}
