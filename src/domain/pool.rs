//! Version-independent view of pool and user staking state.
//!
//! The two program layouts disagree on which reward fields exist. Callers
//! see one [`PoolConfig`] tagged union and match on it exhaustively rather
//! than probing for fields.

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use utoipa::ToSchema;

/// Which on-chain program layout is active for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgramVersion {
    /// First-generation program with a flat per-second multiplier.
    Legacy,
    /// Rate-based program carrying `current_reward_rate`.
    Sustainable,
}

impl ProgramVersion {
    /// `true` for the sustainable layout.
    #[must_use]
    pub const fn is_new_version(self) -> bool {
        matches!(self, Self::Sustainable)
    }
}

impl std::fmt::Display for ProgramVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Sustainable => write!(f, "sustainable"),
        }
    }
}

/// Reward model in effect, derived from the reward rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    /// `current_reward_rate > 0`: the accumulator advances with time.
    Sustainable,
    /// No rate: the accumulator is frozen between settlements.
    Legacy,
    /// The user has no stake account, so no model applies to them.
    Unknown,
}

/// Pool configuration under the legacy layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyPoolConfig {
    /// Staked token mint.
    pub token_mint: Pubkey,
    /// Pool-owned token account holding deposits.
    pub pool_vault: Pubkey,
    /// Total tokens staked pool-wide, base units.
    pub total_deposit: u64,
    /// Per-share accumulator scaled by `PRECISION`.
    pub total_rate: u128,
    /// Unix seconds of the last accumulator advance.
    pub last_reward_time: i64,
    /// Flat per-second multiplier in token base units.
    pub reward_multiplier: u64,
    /// Advisory claim period in seconds.
    pub claim_period: i64,
}

/// Pool configuration under the sustainable layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SustainablePoolConfig {
    /// Staked token mint.
    pub token_mint: Pubkey,
    /// Pool-owned token account holding deposits.
    pub pool_vault: Pubkey,
    /// Pool-owned token account paying rewards.
    pub reward_vault: Pubkey,
    /// Total tokens staked pool-wide, base units.
    pub total_deposit: u64,
    /// Per-share accumulator scaled by `PRECISION`.
    pub total_rate: u128,
    /// Unix seconds of the last accumulator advance.
    pub last_reward_time: i64,
    /// Pool-wide reward rate, scaled by `PRECISION`, per second.
    pub current_reward_rate: u128,
}

/// Pool configuration under whichever layout was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolConfig {
    /// Legacy layout.
    Legacy(LegacyPoolConfig),
    /// Sustainable layout.
    Sustainable(SustainablePoolConfig),
}

impl PoolConfig {
    /// Layout this configuration was decoded from.
    #[must_use]
    pub const fn version(&self) -> ProgramVersion {
        match self {
            Self::Legacy(_) => ProgramVersion::Legacy,
            Self::Sustainable(_) => ProgramVersion::Sustainable,
        }
    }

    /// Total tokens staked pool-wide.
    #[must_use]
    pub const fn total_deposit(&self) -> u64 {
        match self {
            Self::Legacy(c) => c.total_deposit,
            Self::Sustainable(c) => c.total_deposit,
        }
    }

    /// Stored per-share accumulator.
    #[must_use]
    pub const fn total_rate(&self) -> u128 {
        match self {
            Self::Legacy(c) => c.total_rate,
            Self::Sustainable(c) => c.total_rate,
        }
    }

    /// Unix seconds of the last accumulator advance.
    #[must_use]
    pub const fn last_reward_time(&self) -> i64 {
        match self {
            Self::Legacy(c) => c.last_reward_time,
            Self::Sustainable(c) => c.last_reward_time,
        }
    }

    /// Scaled reward rate; `0` under the legacy layout.
    #[must_use]
    pub const fn current_reward_rate(&self) -> u128 {
        match self {
            Self::Legacy(_) => 0,
            Self::Sustainable(c) => c.current_reward_rate,
        }
    }

    /// Staked token mint.
    #[must_use]
    pub const fn token_mint(&self) -> Pubkey {
        match self {
            Self::Legacy(c) => c.token_mint,
            Self::Sustainable(c) => c.token_mint,
        }
    }

    /// Pool-owned deposit vault.
    #[must_use]
    pub const fn pool_vault(&self) -> Pubkey {
        match self {
            Self::Legacy(c) => c.pool_vault,
            Self::Sustainable(c) => c.pool_vault,
        }
    }

    /// Reward vault, present only under the sustainable layout.
    #[must_use]
    pub const fn reward_vault(&self) -> Option<Pubkey> {
        match self {
            Self::Legacy(_) => None,
            Self::Sustainable(c) => Some(c.reward_vault),
        }
    }

    /// [`SystemType::Sustainable`] iff the reward rate is positive.
    #[must_use]
    pub const fn system_type(&self) -> SystemType {
        if self.current_reward_rate() > 0 {
            SystemType::Sustainable
        } else {
            SystemType::Legacy
        }
    }
}

/// A staker's account, decoded from either layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserPosition {
    /// Staked amount, base units.
    pub deposit: u64,
    /// Scaled `deposit * accumulator` at the last settlement.
    pub debt: u128,
    /// Unix seconds of the last settlement.
    pub last_update: i64,
    /// Whether the program finished initialising the account.
    pub initialized: bool,
}
