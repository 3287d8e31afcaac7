use serde::{Deserialize, Serialize};

/// AMM platform a staking token's pool lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Balancer,
    Uniswap,
    Curve,
}

/// Where a staking-rewards position sits in its reward period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualState {
    /// No snapshot has been delivered yet.
    NoData,
    /// Snapshot present but nothing is staked in the contract.
    Idle,
    /// Rewards are streaming.
    Accruing,
    /// `now >= period_finish`; estimates are frozen at the boundary.
    PeriodEnded,
}
