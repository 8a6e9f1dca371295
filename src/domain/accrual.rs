//! Time-weighted reward accrual.
//!
//! Extrapolates the pool accumulator from `last_reward_time` to "now" and
//! settles a user's claimable balance against their debt. The integer
//! pipeline is exact; the float rates at the end are for display only and
//! are never read back into the integer fields.

use super::fixed_point::{
    MathError, PRECISION, checked_add, clamp_non_negative, mul_div, scaled_div_trunc, scaled_mul,
};
use super::pool::{PoolConfig, SystemType, UserPosition};

/// Seconds per hour.
const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Seconds per day.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Display-only earning rates in whole tokens.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EarningRates {
    /// Tokens per second.
    pub per_second: f64,
    /// Tokens per hour.
    pub per_hour: f64,
    /// Tokens per day.
    pub per_day: f64,
    /// User has a deposit and the pool pays a positive rate.
    pub can_earn_rewards: bool,
}

/// Result of one accrual computation. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccrualResult {
    /// Model in effect for this user.
    pub system_type: SystemType,
    /// Pool rewards accrued since `last_reward_time`, base units.
    pub period_rewards: u128,
    /// Per-share increment added to the stored accumulator.
    pub increment: u128,
    /// Accumulator extrapolated to now.
    pub acc_per_share: u128,
    /// User's deposit, base units.
    pub user_deposit: u64,
    /// User's debt baseline.
    pub user_debt: u128,
    /// `deposit * acc_per_share / PRECISION`.
    pub raw_rewards: u128,
    /// `max(0, raw_rewards - debt)`.
    pub claimable_amount: u128,
    /// User share of the pool in basis points (integer ratio).
    pub user_share_bps: u128,
    /// Pool-wide tokens per second (display only).
    pub global_rate: f64,
    /// User's tokens per second (display only).
    pub user_reward_rate: f64,
    /// Derived earning rates (display only).
    pub earning_rates: EarningRates,
}

impl AccrualResult {
    /// Zero result for a wallet with no stake account.
    ///
    /// Same shape as a real result so clients never branch on it.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            system_type: SystemType::Unknown,
            period_rewards: 0,
            increment: 0,
            acc_per_share: 0,
            user_deposit: 0,
            user_debt: 0,
            raw_rewards: 0,
            claimable_amount: 0,
            user_share_bps: 0,
            global_rate: 0.0,
            user_reward_rate: 0.0,
            earning_rates: EarningRates {
                per_second: 0.0,
                per_hour: 0.0,
                per_day: 0.0,
                can_earn_rewards: false,
            },
        }
    }
}

/// Computes reward accrual for a pool and an optional user position.
#[derive(Debug, Clone, Copy)]
pub struct RewardAccrualCalculator {
    token_decimals: u8,
}

impl RewardAccrualCalculator {
    /// Creates a calculator for a token with `token_decimals` decimals.
    #[must_use]
    pub const fn new(token_decimals: u8) -> Self {
        Self { token_decimals }
    }

    /// Accumulator value at `now`, without persisting anything.
    ///
    /// Frozen when the pool has no deposits, when the reward rate is zero,
    /// or when `now` is not past `last_reward_time` (clock skew never makes
    /// elapsed time negative).
    ///
    /// Returns `(period_rewards, increment, acc_per_share)`.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ArithmeticOverflow`] if an intermediate exceeds
    /// 128 bits.
    pub fn accumulator_at(
        &self,
        config: &PoolConfig,
        now: i64,
    ) -> Result<(u128, u128, u128), MathError> {
        let stored = config.total_rate();
        let total_deposit = u128::from(config.total_deposit());

        let PoolConfig::Sustainable(pool) = config else {
            return Ok((0, 0, stored));
        };
        if pool.current_reward_rate == 0 || total_deposit == 0 {
            return Ok((0, 0, stored));
        }

        let elapsed = u128::try_from(now.saturating_sub(pool.last_reward_time)).unwrap_or(0);
        if elapsed == 0 {
            return Ok((0, 0, stored));
        }

        let period_rewards = mul_div(pool.current_reward_rate, elapsed, PRECISION)?;
        let increment = mul_div(period_rewards, PRECISION, total_deposit)?;
        let acc_per_share = checked_add(stored, increment)?;
        Ok((period_rewards, increment, acc_per_share))
    }

    /// Computes the full accrual result.
    ///
    /// A missing or uninitialised user account yields
    /// [`AccrualResult::empty`], not an error.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ArithmeticOverflow`] if any integer step exceeds
    /// 128 bits.
    pub fn compute(
        &self,
        config: &PoolConfig,
        user: Option<&UserPosition>,
        now: i64,
    ) -> Result<AccrualResult, MathError> {
        let Some(user) = user.filter(|u| u.initialized) else {
            return Ok(AccrualResult::empty());
        };

        let (period_rewards, increment, acc_per_share) = self.accumulator_at(config, now)?;

        let deposit = u128::from(user.deposit);
        let raw_rewards = scaled_div_trunc(scaled_mul(deposit, acc_per_share)?, PRECISION)?;
        let claimable_amount = clamp_non_negative(raw_rewards, user.debt);

        let total_deposit = u128::from(config.total_deposit());
        let user_share_bps = if total_deposit > 0 {
            mul_div(deposit, 10_000, total_deposit)?
        } else {
            0
        };

        let global_rate = self.global_rate(config);
        #[allow(clippy::cast_precision_loss)]
        let user_reward_rate = if total_deposit > 0 {
            (deposit as f64 / total_deposit as f64) * global_rate
        } else {
            0.0
        };

        Ok(AccrualResult {
            system_type: config.system_type(),
            period_rewards,
            increment,
            acc_per_share,
            user_deposit: user.deposit,
            user_debt: user.debt,
            raw_rewards,
            claimable_amount,
            user_share_bps,
            global_rate,
            user_reward_rate,
            earning_rates: EarningRates {
                per_second: user_reward_rate,
                per_hour: user_reward_rate * SECONDS_PER_HOUR,
                per_day: user_reward_rate * SECONDS_PER_DAY,
                can_earn_rewards: user.deposit > 0 && global_rate > 0.0,
            },
        })
    }

    /// Pool-wide tokens per second, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn global_rate(&self, config: &PoolConfig) -> f64 {
        let token_scale = 10f64.powi(i32::from(self.token_decimals));
        match config {
            PoolConfig::Sustainable(pool) => {
                pool.current_reward_rate as f64 / PRECISION as f64 / token_scale
            }
            PoolConfig::Legacy(pool) => pool.reward_multiplier as f64 / token_scale,
        }
    }
}
