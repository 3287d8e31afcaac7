//! View models handed to presentation layers.

use earn_domain::entities::{NormalizedPool, RewardsEarned, StakingRewardsContract};
use earn_domain::enums::AccrualState;
use earn_domain::metrics::ApyMetric;
use earn_domain::value_objects::Price;
use rust_decimal::Decimal;
use serde::Serialize;

/// Claimable rewards as of one display tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveRewards {
    pub state: AccrualState,
    pub rewards_earned: RewardsEarned,
    pub seconds_remaining: u64,
}

/// Everything known about one staking position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionMetrics {
    pub contract: StakingRewardsContract,
    pub state: AccrualState,
    pub rewards_earned: RewardsEarned,
    pub staking_token_price: Option<Price>,
    pub rewards_token_price: Option<Price>,
    pub platform_token_price: Option<Price>,
    /// USD value of the user's staked balance.
    pub staked_value_usd: Option<Decimal>,
    /// User balance over contract total supply, as a fraction.
    pub pool_share: Option<Decimal>,
    pub seconds_remaining: u64,
    pub staking_token_apy: ApyMetric,
    pub combined_rewards_tokens_apy: ApyMetric,
    /// The priced pool issuing the staking token.
    pub pool: Option<NormalizedPool>,
}

/// One staking-rewards contract as seen by a consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EarnPosition {
    /// No snapshot has arrived for the contract yet.
    Loading { contract: StakingRewardsContract },
    Ready(Box<PositionMetrics>),
}

impl EarnPosition {
    pub fn contract(&self) -> &StakingRewardsContract {
        match self {
            EarnPosition::Loading { contract } => contract,
            EarnPosition::Ready(metrics) => &metrics.contract,
        }
    }

    pub fn metrics(&self) -> Option<&PositionMetrics> {
        match self {
            EarnPosition::Loading { .. } => None,
            EarnPosition::Ready(metrics) => Some(metrics),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, EarnPosition::Loading { .. })
    }
}
