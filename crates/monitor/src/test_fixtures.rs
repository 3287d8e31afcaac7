use earn_aggregator::{EarnDataAggregator, SessionData};
use earn_domain::entities::{
    ApyBaseline, BlockRef, NormalizedPool, PoolExtras, PoolToken, RewardEntry, RewardStream,
    StakingRewardsContract, StakingRewardsSnapshot, Token,
};
use earn_domain::enums::Platform;
use earn_domain::metrics::SECONDS_PER_DAY;
use earn_domain::value_objects::{FixedPointAmount, Price, PriceMap};
use rust_decimal_macros::dec;

pub const LAST_UPDATE: u64 = 1_700_000_000;

pub fn wad(value: &str) -> FixedPointAmount {
    FixedPointAmount::parse_units(value, 18).unwrap()
}

/// USDC/WETH pair worth $1M with 1000 LP outstanding.
pub fn pools() -> Vec<NormalizedPool> {
    let token = |address: &str, decimals: u8, reserve: &str| PoolToken {
        address: address.to_string(),
        decimals,
        symbol: address.trim_start_matches("0x").to_uppercase(),
        liquidity: FixedPointAmount::parse_units(reserve, decimals).unwrap(),
        price: None,
        ratio: 50,
    };
    vec![NormalizedPool {
        address: "0xpair".to_string(),
        platform: Platform::Uniswap,
        tokens: vec![token("0xusdc", 6, "500000"), token("0xweth", 18, "500")],
        total_supply: wad("1000"),
        extras: PoolExtras::Uniswap {
            reserve_usd: dec!(1000000),
            total_volume_usd: Some(dec!(2000000)),
        },
    }]
}

pub fn contract() -> StakingRewardsContract {
    StakingRewardsContract {
        address: "0xStake".to_string(),
        title: "USDC/WETH".to_string(),
        staking_token: Token::new("0xpair", "UNI-V2", 18),
        rewards_token: Token::new("0xmta", "MTA", 18),
        platform_token: None,
        pool_address: None,
        external_staking_token_apy: None,
    }
}

pub fn baseline() -> ApyBaseline {
    ApyBaseline {
        block_24h_ago: BlockRef {
            timestamp: LAST_UPDATE + 3600 - SECONDS_PER_DAY,
            block_number: 11_000_000,
        },
        reward_per_token_stored_24h_ago: wad("2.2"),
        platform_reward_per_token_stored_24h_ago: None,
        total_swap_volume_24h_ago: Some(dec!(1900000)),
    }
}

pub fn session_data() -> SessionData {
    let mut prices = PriceMap::new();
    prices.insert("0xusdc", Price::new(dec!(1)));
    prices.insert("0xweth", Price::new(dec!(1000)));
    prices.insert("0xmta", Price::new(dec!(2)));
    SessionData::new(pools(), prices).with_contract(contract())
}

pub fn aggregator() -> EarnDataAggregator {
    EarnDataAggregator::new(session_data())
}

/// 500 LP staked, 50 of them the user's, 1 MTA per second for a week.
pub fn snapshot(last_update_time: u64) -> StakingRewardsSnapshot {
    StakingRewardsSnapshot {
        address: "0xstake".to_string(),
        last_update_time,
        period_finish: last_update_time + 7 * SECONDS_PER_DAY,
        total_supply: wad("500"),
        staking_balance: wad("50"),
        rewards: RewardStream {
            reward_rate: wad("1"),
            reward_per_token_stored: wad("10"),
            user: RewardEntry {
                amount: FixedPointAmount::zero(18),
                amount_per_token_paid: wad("10"),
            },
        },
        platform_rewards: None,
        curve: None,
    }
}
