//! Annualized yield for staking-rewards positions.
//!
//! Two figures are reported per contract:
//! - the combined rewards-tokens APY, from how far the reward-per-token
//!   accumulators of both streams moved over the last 24 hours
//! - the staking-token APY, from the swap fees the underlying pool earned
//!   over the same window
//!
//! Both are expressed relative to the staking token's USD price. Whenever
//! the baseline or a price is missing the result is
//! [`ApyMetric::AwaitingData`], never zero.

use earn_domain::entities::{
    ApyBaseline, NormalizedPool, PoolExtras, StakingRewardsContract, Token,
};
use earn_domain::metrics::{ApyMetric, annualize};
use earn_domain::value_objects::{FixedPointAmount, Price, WAD_DECIMALS};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

/// Uniswap v2 charges a flat 0.3% on every swap.
pub const UNISWAP_V2_SWAP_FEE: Decimal = dec!(0.003);

/// USD prices an APY computation needs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApyPrices {
    pub staking_token: Option<Price>,
    pub rewards_token: Option<Price>,
    pub platform_token: Option<Price>,
}

/// Current accumulator values of a contract's reward streams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardPerToken {
    pub rewards: FixedPointAmount,
    pub platform: Option<FixedPointAmount>,
}

fn measured(increase: Decimal, baseline: &ApyBaseline, now: u64, metric: &str) -> ApyMetric {
    match annualize(increase, baseline.block_24h_ago.timestamp, now) {
        Ok(value) => ApyMetric::Measured { value },
        Err(e) => {
            warn!(metric, error = %e, "Cannot annualize");
            ApyMetric::AwaitingData
        }
    }
}

fn usd_per_staking_token(delta: Decimal, price: Option<Price>) -> Option<Decimal> {
    delta.checked_mul(price?.value)
}

/// Whole reward tokens per whole staking token between two accumulator
/// readings.
///
/// The accumulator counts reward base units per staking base unit times
/// 1e18, so the raw delta is scaled by `10^(18 + reward - staking)`.
/// Labels on the amounts are ignored.
fn rewards_per_staking_token(
    current: &FixedPointAmount,
    then: &FixedPointAmount,
    reward: &Token,
    staking: &Token,
) -> Option<Decimal> {
    let scale = (u16::from(WAD_DECIMALS) + u16::from(reward.decimals))
        .checked_sub(u16::from(staking.decimals))?;
    let delta = current.exact.saturating_sub(then.exact);
    Some(FixedPointAmount::new(delta, u8::try_from(scale).ok()?).to_decimal())
}

/// Combined APY of the reward streams, as a fraction of the staking
/// token's price.
///
/// formula: (Δrpt_rewards × p_rewards + Δrpt_platform × p_platform) / p_staking,
/// annualized over the baseline window. Each Δrpt is in whole tokens, using
/// the decimals of `contract`'s tokens.
pub fn combined_rewards_tokens_apy(
    contract: &StakingRewardsContract,
    baseline: Option<&ApyBaseline>,
    current: &RewardPerToken,
    prices: &ApyPrices,
    now: u64,
) -> ApyMetric {
    let Some(baseline) = baseline else {
        return ApyMetric::AwaitingData;
    };
    let Some(staking_price) = prices.staking_token.filter(|p| !p.value.is_zero()) else {
        return ApyMetric::AwaitingData;
    };

    let staking = &contract.staking_token;
    let Some(rewards_usd) = rewards_per_staking_token(
        &current.rewards,
        &baseline.reward_per_token_stored_24h_ago,
        &contract.rewards_token,
        staking,
    )
    .and_then(|d| usd_per_staking_token(d, prices.rewards_token)) else {
        return ApyMetric::AwaitingData;
    };

    let platform_usd = match current.platform {
        None => Some(Decimal::ZERO),
        Some(platform_now) => baseline
            .platform_reward_per_token_stored_24h_ago
            .as_ref()
            .zip(contract.platform_token.as_ref())
            .and_then(|(then, token)| {
                rewards_per_staking_token(&platform_now, then, token, staking)
            })
            .and_then(|d| usd_per_staking_token(d, prices.platform_token)),
    };
    let Some(increase) = platform_usd
        .and_then(|p| rewards_usd.checked_add(p))
        .and_then(|usd| usd.checked_div(staking_price.value))
    else {
        return ApyMetric::AwaitingData;
    };

    measured(increase, baseline, now, "combined_rewards_tokens_apy")
}

/// APY of holding the staking token itself, from pool swap fees.
///
/// An externally supplied value (contract metadata or a Curve pool) is
/// passed through as [`ApyMetric::External`].
pub fn staking_token_apy(
    contract: &StakingRewardsContract,
    pool: Option<&NormalizedPool>,
    baseline: Option<&ApyBaseline>,
    staking_price: Option<Price>,
    now: u64,
) -> ApyMetric {
    if let Some(value) = contract.external_staking_token_apy {
        return ApyMetric::External { value };
    }
    let Some(pool) = pool else {
        return ApyMetric::AwaitingData;
    };

    let (volume_now, fee) = match &pool.extras {
        PoolExtras::Curve { external_apy, .. } => {
            return match external_apy {
                Some(value) => ApyMetric::External { value: *value },
                None => ApyMetric::AwaitingData,
            };
        }
        PoolExtras::Balancer {
            total_swap_volume,
            swap_fee,
        } => (Some(*total_swap_volume), *swap_fee),
        PoolExtras::Uniswap {
            total_volume_usd, ..
        } => (*total_volume_usd, UNISWAP_V2_SWAP_FEE),
    };

    let Some(baseline) = baseline else {
        return ApyMetric::AwaitingData;
    };
    let (Some(volume_now), Some(volume_then)) = (volume_now, baseline.total_swap_volume_24h_ago)
    else {
        return ApyMetric::AwaitingData;
    };
    let Some(staking_price) = staking_price.filter(|p| !p.value.is_zero()) else {
        return ApyMetric::AwaitingData;
    };
    let supply = pool.total_supply.to_decimal();
    if supply.is_zero() {
        return ApyMetric::AwaitingData;
    }

    let volume = (volume_now - volume_then).max(Decimal::ZERO);
    let Some(increase) = volume
        .checked_mul(fee)
        .and_then(|fees_usd| fees_usd.checked_div(supply))
        .and_then(|per_lp| per_lp.checked_div(staking_price.value))
    else {
        return ApyMetric::AwaitingData;
    };

    measured(increase, baseline, now, "staking_token_apy")
}
