pub mod pool;
pub mod staking_rewards;
pub mod token;

// Re-export for easier access
pub use pool::{NormalizedPool, PoolExtras, PoolToken};
pub use staking_rewards::{
    ApyBaseline, BlockRef, CurveRewards, RewardEntry, RewardStream, RewardsEarned,
    StakingRewardsContract, StakingRewardsSnapshot,
};
pub use token::Token;
