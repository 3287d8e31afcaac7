//! Composition of session data and chain snapshots into view models.

use crate::apy::{ApyPrices, RewardPerToken, combined_rewards_tokens_apy, staking_token_apy};
use crate::pricing::PricedPools;
use crate::session::SessionData;
use crate::view::{EarnPosition, LiveRewards, PositionMetrics};
use earn_domain::entities::{
    NormalizedPool, RewardsEarned, StakingRewardsContract, StakingRewardsSnapshot,
};
use earn_domain::metrics::ApyMetric;
use earn_domain::value_objects::{Price, PriceMap};
use earn_simulation::reward_accrual::{AccrualEstimate, accrual_state, simulate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Latest snapshot per staking-rewards contract, keyed by lower-cased
/// address.
pub type SnapshotMap = HashMap<String, StakingRewardsSnapshot>;

/// Indexes snapshots by contract address.
pub fn index_snapshots(
    snapshots: impl IntoIterator<Item = StakingRewardsSnapshot>,
) -> SnapshotMap {
    snapshots
        .into_iter()
        .map(|s| (s.address.to_lowercase(), s))
        .collect()
}

/// Builds one [`EarnPosition`] per contract in the session.
///
/// The price pipeline runs once on construction; every other call is a
/// pure function of the snapshots and `now` passed in.
#[derive(Debug, Clone)]
pub struct EarnDataAggregator {
    session: Arc<SessionData>,
    priced: PricedPools,
}

impl EarnDataAggregator {
    pub fn new(session: impl Into<Arc<SessionData>>) -> Self {
        let session = session.into();
        let priced = PricedPools::build(session.raw_prices(), session.pools());
        Self { session, priced }
    }

    pub fn session(&self) -> &SessionData {
        &self.session
    }

    /// Raw prices merged with derived LP prices.
    pub fn prices(&self) -> &PriceMap {
        &self.priced.prices
    }

    /// Pools with constituent prices attached.
    pub fn pools(&self) -> &[NormalizedPool] {
        &self.priced.pools
    }

    fn price(&self, address: &str) -> Option<Price> {
        self.priced.prices.get(address)
    }

    fn staking_token_price(&self, contract: &StakingRewardsContract) -> Option<Price> {
        self.price(&contract.staking_token.address).or_else(|| {
            contract
                .pool_address
                .as_deref()
                .and_then(|pool| self.price(pool))
        })
    }

    fn priced_pool(&self, contract: &StakingRewardsContract) -> Option<&NormalizedPool> {
        let address = contract
            .pool_address
            .as_deref()
            .unwrap_or(&contract.staking_token.address);
        self.priced.pool(address)
    }

    fn estimate(&self, snapshot: &StakingRewardsSnapshot, now: u64) -> Option<AccrualEstimate> {
        match simulate(snapshot, now) {
            Ok(estimate) => Some(estimate),
            Err(e) => {
                warn!(contract = %snapshot.address, error = %e, "Reward estimate unavailable");
                None
            }
        }
    }

    /// Claimable rewards for one contract at `now`.
    ///
    /// Cheap enough to run on every display tick: no pool or APY work.
    pub fn live_rewards(
        &self,
        contract: &StakingRewardsContract,
        snapshot: Option<&StakingRewardsSnapshot>,
        now: u64,
    ) -> LiveRewards {
        let state = accrual_state(snapshot, now);
        let Some(snapshot) = snapshot else {
            return LiveRewards {
                state,
                rewards_earned: RewardsEarned::default(),
                seconds_remaining: 0,
            };
        };
        let seconds_remaining = snapshot.period_finish.saturating_sub(now);
        let rewards_earned = self
            .estimate(snapshot, now)
            .map(|e| self.price_estimate(contract, &e))
            .unwrap_or_default();
        LiveRewards {
            state,
            rewards_earned,
            seconds_remaining,
        }
    }

    fn price_estimate(
        &self,
        contract: &StakingRewardsContract,
        estimate: &AccrualEstimate,
    ) -> RewardsEarned {
        let platform_price = contract
            .platform_token
            .as_ref()
            .and_then(|t| self.price(&t.address));
        estimate.to_rewards_earned(self.price(&contract.rewards_token.address), platform_price)
    }

    /// View model for one contract.
    pub fn position(
        &self,
        contract: &StakingRewardsContract,
        snapshot: Option<&StakingRewardsSnapshot>,
        now: u64,
    ) -> EarnPosition {
        let Some(snapshot) = snapshot else {
            debug!(contract = %contract.address, "No snapshot yet");
            return EarnPosition::Loading {
                contract: contract.clone(),
            };
        };

        let prices = ApyPrices {
            staking_token: self.staking_token_price(contract),
            rewards_token: self.price(&contract.rewards_token.address),
            platform_token: contract
                .platform_token
                .as_ref()
                .and_then(|t| self.price(&t.address)),
        };
        let baseline = self.session.baseline(&contract.address);
        let pool = self.priced_pool(contract);
        let estimate = self.estimate(snapshot, now);

        let (rewards_earned, combined_apy) = match &estimate {
            Some(estimate) => {
                let current = RewardPerToken {
                    rewards: estimate
                        .rewards
                        .reward_per_token
                        .unwrap_or(snapshot.rewards.reward_per_token_stored),
                    platform: snapshot.platform_rewards.as_ref().map(|stream| {
                        estimate
                            .platform_rewards
                            .as_ref()
                            .and_then(|p| p.reward_per_token)
                            .unwrap_or(stream.reward_per_token_stored)
                    }),
                };
                (
                    self.price_estimate(contract, estimate),
                    combined_rewards_tokens_apy(contract, baseline, &current, &prices, now),
                )
            }
            None => (RewardsEarned::default(), ApyMetric::AwaitingData),
        };

        let staked_value_usd = prices
            .staking_token
            .and_then(|p| p.value_of(&snapshot.staking_balance));
        let pool_share = snapshot
            .staking_balance
            .div_precise(&snapshot.total_supply)
            .ok()
            .map(|share| share.to_decimal());

        EarnPosition::Ready(Box::new(PositionMetrics {
            contract: contract.clone(),
            state: accrual_state(Some(snapshot), now),
            rewards_earned,
            staking_token_price: prices.staking_token,
            rewards_token_price: prices.rewards_token,
            platform_token_price: prices.platform_token,
            staked_value_usd,
            pool_share,
            seconds_remaining: snapshot.period_finish.saturating_sub(now),
            staking_token_apy: staking_token_apy(
                contract,
                pool,
                baseline,
                prices.staking_token,
                now,
            ),
            combined_rewards_tokens_apy: combined_apy,
            pool: pool.cloned(),
        }))
    }

    /// One position per session contract, in session order.
    pub fn aggregate(&self, snapshots: &SnapshotMap, now: u64) -> Vec<EarnPosition> {
        self.session
            .contracts()
            .iter()
            .map(|contract| {
                let snapshot = snapshots.get(&contract.address.to_lowercase());
                self.position(contract, snapshot, now)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earn_domain::entities::{
        ApyBaseline, BlockRef, CurveRewards, RewardEntry, RewardStream, Token,
    };
    use earn_domain::enums::AccrualState;
    use earn_domain::metrics::SECONDS_PER_DAY;
    use earn_domain::value_objects::FixedPointAmount;
    use earn_protocols::{NormalizePool, UniswapPairRecord, UniswapTokenRecord};
    use rust_decimal_macros::dec;

    const LAST_UPDATE: u64 = 1_700_000_000;
    const NOW: u64 = LAST_UPDATE + 3600;

    fn wad(value: &str) -> FixedPointAmount {
        FixedPointAmount::parse_units(value, 18).unwrap()
    }

    /// USDC/WETH pair worth $1M with 1000 LP outstanding: $1000 per LP.
    fn pool() -> NormalizedPool {
        UniswapPairRecord {
            id: "0xPair".to_string(),
            token0: UniswapTokenRecord {
                id: "0xusdc".to_string(),
                symbol: "USDC".to_string(),
                decimals: 6,
            },
            token1: UniswapTokenRecord {
                id: "0xweth".to_string(),
                symbol: "WETH".to_string(),
                decimals: 18,
            },
            reserve0: "500000".to_string(),
            reserve1: "500".to_string(),
            total_supply: "1000".to_string(),
            reserve_usd: "1000000".to_string(),
            volume_usd: Some("2000000".to_string()),
        }
        .normalize()
        .unwrap()
    }

    fn contract() -> StakingRewardsContract {
        StakingRewardsContract {
            address: "0xStake".to_string(),
            title: "USDC/WETH".to_string(),
            staking_token: Token::new("0xPair", "UNI-V2", 18),
            rewards_token: Token::new("0xmta", "MTA", 18),
            platform_token: None,
            pool_address: None,
            external_staking_token_apy: None,
        }
    }

    fn prices() -> PriceMap {
        let mut prices = PriceMap::new();
        prices.insert("0xusdc", Price::new(dec!(1)));
        prices.insert("0xweth", Price::new(dec!(1000)));
        prices.insert("0xmta", Price::new(dec!(2)));
        prices
    }

    fn baseline() -> ApyBaseline {
        ApyBaseline {
            block_24h_ago: BlockRef {
                timestamp: NOW - SECONDS_PER_DAY,
                block_number: 11_000_000,
            },
            reward_per_token_stored_24h_ago: wad("2.2"),
            platform_reward_per_token_stored_24h_ago: None,
            total_swap_volume_24h_ago: Some(dec!(1900000)),
        }
    }

    /// 500 LP staked, 50 of them the user's, 1 MTA per second.
    fn snapshot() -> StakingRewardsSnapshot {
        StakingRewardsSnapshot {
            address: "0xstake".to_string(),
            last_update_time: LAST_UPDATE,
            period_finish: LAST_UPDATE + 7 * SECONDS_PER_DAY,
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

    fn aggregator(with_baseline: bool) -> EarnDataAggregator {
        let mut session = SessionData::new(vec![pool()], prices()).with_contract(contract());
        if with_baseline {
            session.set_baseline("0xstake", baseline());
        }
        EarnDataAggregator::new(session)
    }

    #[test]
    fn test_missing_snapshot_is_loading() {
        let positions = aggregator(true).aggregate(&SnapshotMap::new(), NOW);
        assert_eq!(positions.len(), 1);
        assert!(positions[0].is_loading());
        assert_eq!(positions[0].contract().title, "USDC/WETH");
    }

    #[test]
    fn test_ready_position() {
        let agg = aggregator(true);
        let positions = agg.aggregate(&index_snapshots([snapshot()]), NOW);
        let metrics = positions[0].metrics().unwrap();

        assert_eq!(metrics.state, AccrualState::Accruing);
        assert_eq!(metrics.staking_token_price, Some(Price::new(dec!(1000))));
        // 3600 s / 500 staked = 7.2 per token, 50 staked = 360 MTA at $2.
        let earned = &metrics.rewards_earned;
        assert_eq!(earned.rewards.unwrap().format_units(), "360");
        assert_eq!(earned.rewards_usd, Some(dec!(720)));
        assert_eq!(earned.platform_rewards, None);
        assert_eq!(metrics.staked_value_usd, Some(dec!(50000)));
        assert_eq!(metrics.pool_share, Some(dec!(0.1)));
        assert_eq!(metrics.seconds_remaining, 7 * SECONDS_PER_DAY - 3600);
        assert!(metrics.pool.as_ref().unwrap().is_fully_priced());

        // rpt 17.2 - 2.2 = 15 MTA = $30 per $1000 LP per day.
        assert_eq!(
            metrics.combined_rewards_tokens_apy,
            ApyMetric::Measured { value: dec!(10.95) }
        );
        // 100k volume * 0.3% over 1000 LP at $1000.
        assert_eq!(
            metrics.staking_token_apy,
            ApyMetric::Measured { value: dec!(0.1095) }
        );
    }

    #[test]
    fn test_missing_baseline_awaits_data() {
        let agg = aggregator(false);
        let positions = agg.aggregate(&index_snapshots([snapshot()]), NOW);
        let metrics = positions[0].metrics().unwrap();
        assert!(metrics.combined_rewards_tokens_apy.is_awaiting_data());
        assert!(metrics.staking_token_apy.is_awaiting_data());
        assert!(metrics.rewards_earned.rewards_usd.is_some());
    }

    #[test]
    fn test_missing_prices_leave_usd_empty() {
        let session = SessionData::new(vec![pool()], PriceMap::new()).with_contract(contract());
        let agg = EarnDataAggregator::new(session);
        let positions = agg.aggregate(&index_snapshots([snapshot()]), NOW);
        let metrics = positions[0].metrics().unwrap();

        assert!(metrics.rewards_earned.rewards.is_some());
        assert_eq!(metrics.rewards_earned.rewards_usd, None);
        assert_eq!(metrics.staking_token_price, None);
        assert_eq!(metrics.staked_value_usd, None);
        assert!(metrics.combined_rewards_tokens_apy.is_awaiting_data());
    }

    #[test]
    fn test_derived_prices_leave_raw_untouched() {
        let agg = aggregator(true);
        assert_eq!(agg.session().raw_prices().len(), 3);
        assert_eq!(agg.prices().len(), 4);
        assert_eq!(agg.prices().get("0xpair"), Some(Price::new(dec!(1000))));
    }

    #[test]
    fn test_live_rewards() {
        let agg = aggregator(false);
        let live = agg.live_rewards(&contract(), Some(&snapshot()), NOW);
        assert_eq!(live.state, AccrualState::Accruing);
        assert_eq!(live.rewards_earned.rewards_usd, Some(dec!(720)));

        let none = agg.live_rewards(&contract(), None, NOW);
        assert_eq!(none.state, AccrualState::NoData);
        assert_eq!(none.rewards_earned, RewardsEarned::default());
    }

    #[test]
    fn test_curve_position_passes_through() {
        let mut s = snapshot();
        s.curve = Some(CurveRewards {
            rewards_earned: wad("12"),
            platform_rewards_earned: None,
        });
        let agg = aggregator(true);
        let position = agg.position(&contract(), Some(&s), NOW);
        let metrics = position.metrics().unwrap();
        assert_eq!(metrics.rewards_earned.rewards, Some(wad("12")));
        assert_eq!(metrics.rewards_earned.rewards_usd, Some(dec!(24)));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let agg = aggregator(true);
        let snapshots = index_snapshots([snapshot()]);
        assert_eq!(agg.aggregate(&snapshots, NOW), agg.aggregate(&snapshots, NOW));
    }
}
