//! Staking-rewards contracts and the chain state read from them.
//!
//! The layout follows the on-chain `StakingRewards` ledger: a global
//! `rewardPerTokenStored` accumulator updated at `lastUpdateTime`, a
//! per-second `rewardRate` that stops at `periodFinish`, and per-user
//! `rewards` / `userRewardPerTokenPaid` checkpoints.

use crate::entities::token::Token;
use crate::value_objects::amount::FixedPointAmount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's checkpoint in one reward stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    /// Rewards already credited to the user but not yet claimed.
    pub amount: FixedPointAmount,
    /// Value of the reward-per-token accumulator at the user's last checkpoint.
    pub amount_per_token_paid: FixedPointAmount,
}

/// Global accumulator state of one reward stream plus the user's checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardStream {
    /// Reward units emitted per second, 1e18 scale.
    pub reward_rate: FixedPointAmount,
    /// Accumulator value as of `last_update_time`, 1e18 scale.
    pub reward_per_token_stored: FixedPointAmount,
    pub user: RewardEntry,
}

/// Earned amounts reported directly by a Curve gauge integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveRewards {
    pub rewards_earned: FixedPointAmount,
    pub platform_rewards_earned: Option<FixedPointAmount>,
}

/// Chain state of one staking-rewards contract for one user, replaced
/// wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingRewardsSnapshot {
    pub address: String,
    /// Unix seconds of the last accumulator update.
    pub last_update_time: u64,
    /// Unix seconds after which the current period stops emitting.
    pub period_finish: u64,
    /// Total staked in the contract.
    pub total_supply: FixedPointAmount,
    /// Amount staked by the user.
    pub staking_balance: FixedPointAmount,
    pub rewards: RewardStream,
    #[serde(default)]
    pub platform_rewards: Option<RewardStream>,
    #[serde(default)]
    pub curve: Option<CurveRewards>,
}

impl StakingRewardsSnapshot {
    /// `period_finish >= last_update_time`, which the ledger guarantees for
    /// any period that has been notified.
    pub fn is_consistent(&self) -> bool {
        self.period_finish >= self.last_update_time
    }
}

/// Session metadata describing one staking-rewards contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingRewardsContract {
    pub address: String,
    pub title: String,
    /// The LP token staked into the contract.
    pub staking_token: Token,
    pub rewards_token: Token,
    #[serde(default)]
    pub platform_token: Option<Token>,
    /// Pool that issues `staking_token`, when it is a pool-ownership token.
    #[serde(default)]
    pub pool_address: Option<String>,
    /// Staking-token APY computed by an external integration, as a fraction.
    #[serde(default)]
    pub external_staking_token_apy: Option<Decimal>,
}

/// Block reference resolved for "24 hours ago".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub timestamp: u64,
    pub block_number: u64,
}

/// Values sampled once per session at the start of the APY window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApyBaseline {
    pub block_24h_ago: BlockRef,
    pub reward_per_token_stored_24h_ago: FixedPointAmount,
    #[serde(default)]
    pub platform_reward_per_token_stored_24h_ago: Option<FixedPointAmount>,
    /// Cumulative USD swap volume of the staking token's pool at the same block.
    #[serde(default)]
    pub total_swap_volume_24h_ago: Option<Decimal>,
}

/// Live estimate of what the user could claim, recomputed every display tick.
///
/// Every field is optional: a missing price or stream leaves the matching
/// field empty rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardsEarned {
    pub rewards: Option<FixedPointAmount>,
    pub rewards_usd: Option<Decimal>,
    pub platform_rewards: Option<FixedPointAmount>,
    pub platform_rewards_usd: Option<Decimal>,
}

impl RewardsEarned {
    /// Sum of the USD fields that are known.
    pub fn total_usd(&self) -> Option<Decimal> {
        match (self.rewards_usd, self.platform_rewards_usd) {
            (Some(a), Some(b)) => a.checked_add(b),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}
