//! Reward accrual between chain polls.
//!
//! The staking-rewards ledger only updates its accumulator when someone
//! interacts with the contract. Between those updates the claimable balance
//! still grows at `reward_rate`, so the displayed value is extrapolated from
//! the last snapshot with the same integer math the ledger uses:
//!
//! ```text
//! elapsed          = max(0, min(period_finish, now) - last_update_time)
//! reward_per_token = stored + reward_rate * elapsed * 1e18 / total_supply
//! earned           = amount + balance * (reward_per_token - paid) / 1e18
//! ```

use crate::error::SimulationError;
use earn_domain::AmountError;
use earn_domain::entities::{RewardStream, RewardsEarned, StakingRewardsSnapshot};
use earn_domain::enums::AccrualState;
use earn_domain::value_objects::{FixedPointAmount, Price};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const REWARDS_STREAM: &str = "rewards";
const PLATFORM_STREAM: &str = "platform_rewards";

/// Extrapolated state of one reward stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamAccrual {
    /// Accumulator value at the effective time. `None` when the earned
    /// amount was reported directly by an integration.
    pub reward_per_token: Option<FixedPointAmount>,
    /// Rewards credited on-chain but not yet claimed.
    pub unclaimed: FixedPointAmount,
    /// Rewards accrued since the user's last checkpoint.
    pub accrued: FixedPointAmount,
    /// `unclaimed + accrued`.
    pub total: FixedPointAmount,
}

impl StreamAccrual {
    fn reported(amount: FixedPointAmount) -> Self {
        Self {
            reward_per_token: None,
            unclaimed: amount,
            accrued: FixedPointAmount::zero(amount.decimals),
            total: amount,
        }
    }
}

/// Result of extrapolating one snapshot to a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualEstimate {
    pub contract: String,
    pub state: AccrualState,
    /// The `now` the estimate was computed for.
    pub as_of: u64,
    /// `min(now, period_finish)`.
    pub effective_time: u64,
    pub seconds_remaining: u64,
    pub rewards: StreamAccrual,
    pub platform_rewards: Option<StreamAccrual>,
}

impl AccrualEstimate {
    /// Prices the estimated totals. A missing price leaves the USD field
    /// empty.
    pub fn to_rewards_earned(
        &self,
        rewards_price: Option<Price>,
        platform_price: Option<Price>,
    ) -> RewardsEarned {
        let rewards = self.rewards.total;
        let platform_rewards = self.platform_rewards.as_ref().map(|p| p.total);
        RewardsEarned {
            rewards: Some(rewards),
            rewards_usd: rewards_price.and_then(|p| p.value_of(&rewards)),
            platform_rewards,
            platform_rewards_usd: platform_rewards
                .zip(platform_price)
                .and_then(|(amount, price)| price.value_of(&amount)),
        }
    }
}

/// Classifies where a position is in its reward period.
pub fn accrual_state(snapshot: Option<&StakingRewardsSnapshot>, now: u64) -> AccrualState {
    match snapshot {
        None => AccrualState::NoData,
        Some(s) if s.total_supply.is_zero() => AccrualState::Idle,
        Some(s) if now >= s.period_finish => AccrualState::PeriodEnded,
        Some(_) => AccrualState::Accruing,
    }
}

/// Accumulator value after `elapsed` seconds of emission.
///
/// With nothing staked the ledger does not advance the accumulator.
pub fn reward_per_token(
    stream: &RewardStream,
    total_supply: &FixedPointAmount,
    elapsed: u64,
) -> Result<FixedPointAmount, AmountError> {
    if total_supply.is_zero() || elapsed == 0 {
        return Ok(stream.reward_per_token_stored);
    }
    // The ledger scales by 1e18 whatever the staking token's decimals.
    let supply = FixedPointAmount::wad(total_supply.exact);
    let units_per_token = stream
        .reward_rate
        .checked_mul_u64(elapsed)?
        .div_precise(&supply)?;
    stream.reward_per_token_stored.checked_add(&units_per_token)
}

fn accrue_stream(
    stream: &RewardStream,
    snapshot: &StakingRewardsSnapshot,
    elapsed: u64,
) -> Result<StreamAccrual, AmountError> {
    let current = reward_per_token(stream, &snapshot.total_supply, elapsed)?;
    let delta = current.saturating_sub(&stream.user.amount_per_token_paid)?;
    // Accumulator deltas carry the ledger's 1e18 factor, not the reward
    // token's decimals.
    let delta = FixedPointAmount::wad(delta.exact);
    let accrued = FixedPointAmount::new(
        snapshot.staking_balance.mul_truncate(&delta)?.exact,
        stream.user.amount.decimals,
    );
    Ok(StreamAccrual {
        reward_per_token: Some(current),
        unclaimed: stream.user.amount,
        accrued,
        total: stream.user.amount.checked_add(&accrued)?,
    })
}

/// Extrapolates `snapshot` to `now`.
///
/// Snapshots carrying Curve-reported amounts are passed through without
/// any math. Once `now` passes `period_finish` the result no longer
/// changes.
///
/// # Errors
///
/// [`SimulationError::Arithmetic`] when a stream overflows or mixes scales.
pub fn simulate(
    snapshot: &StakingRewardsSnapshot,
    now: u64,
) -> Result<AccrualEstimate, SimulationError> {
    if !snapshot.is_consistent() {
        warn!(
            contract = %snapshot.address,
            last_update_time = snapshot.last_update_time,
            period_finish = snapshot.period_finish,
            "Snapshot period ends before its last update"
        );
    }

    let state = accrual_state(Some(snapshot), now);
    let effective_time = now.min(snapshot.period_finish);
    let seconds_remaining = snapshot.period_finish.saturating_sub(now);

    let (rewards, platform_rewards) = match &snapshot.curve {
        Some(curve) => (
            StreamAccrual::reported(curve.rewards_earned),
            curve.platform_rewards_earned.map(StreamAccrual::reported),
        ),
        None => {
            let elapsed = effective_time.saturating_sub(snapshot.last_update_time);
            let fail = |stream: &'static str| {
                move |source: AmountError| SimulationError::Arithmetic {
                    contract: snapshot.address.clone(),
                    stream,
                    source,
                }
            };
            let rewards = accrue_stream(&snapshot.rewards, snapshot, elapsed)
                .map_err(fail(REWARDS_STREAM))?;
            let platform_rewards = snapshot
                .platform_rewards
                .as_ref()
                .map(|stream| accrue_stream(stream, snapshot, elapsed))
                .transpose()
                .map_err(fail(PLATFORM_STREAM))?;
            (rewards, platform_rewards)
        }
    };

    debug!(
        contract = %snapshot.address,
        state = ?state,
        now,
        rewards = %rewards.total.format_units(),
        "Simulated reward accrual"
    );

    Ok(AccrualEstimate {
        contract: snapshot.address.clone(),
        state,
        as_of: now,
        effective_time,
        seconds_remaining,
        rewards,
        platform_rewards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use earn_domain::entities::{CurveRewards, RewardEntry};
    use primitive_types::U256;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    const LAST_UPDATE: u64 = 1_600_000_000;
    const WEEK: u64 = 7 * 86_400;

    fn wad_units(units: u128) -> FixedPointAmount {
        FixedPointAmount::whole(units, 18).unwrap()
    }

    fn stream(rate_units: u128) -> RewardStream {
        RewardStream {
            reward_rate: wad_units(rate_units),
            reward_per_token_stored: FixedPointAmount::zero(18),
            user: RewardEntry {
                amount: FixedPointAmount::zero(18),
                amount_per_token_paid: FixedPointAmount::zero(18),
            },
        }
    }

    /// 1,000,000 staked in total, the user holds 100,000, 1000 rewards/s.
    fn snapshot() -> StakingRewardsSnapshot {
        StakingRewardsSnapshot {
            address: "0xpool".to_string(),
            last_update_time: LAST_UPDATE,
            period_finish: LAST_UPDATE + WEEK,
            total_supply: wad_units(1_000_000),
            staking_balance: wad_units(100_000),
            rewards: stream(1000),
            platform_rewards: None,
            curve: None,
        }
    }

    #[test]
    fn test_one_hour_of_accrual() {
        let estimate = simulate(&snapshot(), LAST_UPDATE + 3600).unwrap();

        assert_eq!(estimate.state, AccrualState::Accruing);
        assert_eq!(
            estimate.rewards.reward_per_token.unwrap().format_units(),
            "3.6"
        );
        assert_eq!(estimate.rewards.accrued.format_units(), "360000");
        assert_eq!(estimate.rewards.total.format_units(), "360000");
        assert_eq!(estimate.seconds_remaining, WEEK - 3600);
        assert!(estimate.platform_rewards.is_none());
    }

    #[test]
    fn test_unclaimed_and_paid_checkpoint() {
        let mut s = snapshot();
        s.rewards.reward_per_token_stored = wad_units(2);
        s.rewards.user.amount_per_token_paid = wad_units(1);
        s.rewards.user.amount = wad_units(50);

        let estimate = simulate(&s, LAST_UPDATE + 3600).unwrap();
        // rpt = 2 + 3.6 = 5.6; delta = 4.6; 100_000 * 4.6 = 460_000
        assert_eq!(estimate.rewards.accrued.format_units(), "460000");
        assert_eq!(estimate.rewards.total.format_units(), "460050");
        assert_eq!(estimate.rewards.unclaimed.format_units(), "50");
    }

    #[test]
    fn test_frozen_after_period_finish() {
        let s = snapshot();
        let at_finish = simulate(&s, s.period_finish).unwrap();
        let later = simulate(&s, s.period_finish + 10_000).unwrap();

        assert_eq!(at_finish.state, AccrualState::PeriodEnded);
        assert_eq!(later.state, AccrualState::PeriodEnded);
        assert_eq!(at_finish.rewards, later.rewards);
        assert_eq!(later.effective_time, s.period_finish);
        assert_eq!(later.seconds_remaining, 0);
        // 1000/s for a week over 1M staked, 10% share.
        assert_eq!(later.rewards.total.format_units(), "60480000");
    }

    #[test]
    fn test_now_before_last_update_accrues_nothing() {
        let estimate = simulate(&snapshot(), LAST_UPDATE - 60).unwrap();
        assert!(estimate.rewards.accrued.is_zero());
        assert_eq!(
            estimate.rewards.reward_per_token,
            Some(FixedPointAmount::zero(18))
        );
    }

    #[test]
    fn test_zero_supply_is_idle() {
        let mut s = snapshot();
        s.total_supply = FixedPointAmount::zero(18);
        s.rewards.reward_per_token_stored = wad_units(7);
        s.rewards.user.amount_per_token_paid = wad_units(7);
        s.rewards.user.amount = wad_units(3);

        let estimate = simulate(&s, LAST_UPDATE + 3600).unwrap();
        assert_eq!(estimate.state, AccrualState::Idle);
        assert_eq!(estimate.rewards.reward_per_token, Some(wad_units(7)));
        assert!(estimate.rewards.accrued.is_zero());
        assert_eq!(estimate.rewards.total, wad_units(3));
    }

    #[test]
    fn test_zero_balance_surfaces_unclaimed() {
        let mut s = snapshot();
        s.staking_balance = FixedPointAmount::zero(18);
        s.rewards.user.amount = wad_units(5);

        let estimate = simulate(&s, LAST_UPDATE + 3600).unwrap();
        assert!(estimate.rewards.accrued.is_zero());
        assert_eq!(estimate.rewards.total.format_units(), "5");
    }

    #[test]
    fn test_paid_above_current_saturates() {
        let mut s = snapshot();
        s.rewards.user.amount_per_token_paid = wad_units(100);
        let estimate = simulate(&s, LAST_UPDATE + 3600).unwrap();
        assert!(estimate.rewards.accrued.is_zero());
    }

    #[test]
    fn test_platform_stream_is_independent() {
        let mut s = snapshot();
        s.platform_rewards = Some(stream(10));

        let estimate = simulate(&s, LAST_UPDATE + 3600).unwrap();
        let platform = estimate.platform_rewards.unwrap();
        assert_eq!(platform.reward_per_token.unwrap().format_units(), "0.036");
        assert_eq!(platform.total.format_units(), "3600");
        assert_eq!(estimate.rewards.total.format_units(), "360000");
    }

    #[test]
    fn test_curve_amounts_pass_through() {
        let mut s = snapshot();
        s.curve = Some(CurveRewards {
            rewards_earned: wad_units(42),
            platform_rewards_earned: Some(wad_units(7)),
        });

        let estimate = simulate(&s, LAST_UPDATE + 3600).unwrap();
        assert_eq!(estimate.rewards.total, wad_units(42));
        assert!(estimate.rewards.reward_per_token.is_none());
        assert_eq!(estimate.platform_rewards.unwrap().total, wad_units(7));
    }

    #[test]
    fn test_mixed_scales_are_reported() {
        let mut s = snapshot();
        s.rewards.reward_rate = FixedPointAmount::whole(1, 6).unwrap();
        let err = simulate(&s, LAST_UPDATE + 1).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Arithmetic {
                stream: "rewards",
                source: AmountError::DecimalsMismatch { left: 18, right: 6 },
                ..
            }
        ));
    }

    #[test]
    fn test_six_decimal_reward_stream() {
        let usdc = |value: &str| FixedPointAmount::parse_units(value, 6).unwrap();
        let mut s = snapshot();
        s.rewards = RewardStream {
            reward_rate: usdc("1"),
            reward_per_token_stored: FixedPointAmount::zero(6),
            user: RewardEntry {
                amount: usdc("2.5"),
                amount_per_token_paid: FixedPointAmount::zero(6),
            },
        };
        let mut wad_stream = stream(1);
        wad_stream.user.amount = FixedPointAmount::parse_units("2.5", 18).unwrap();
        let mut reference = snapshot();
        reference.rewards = wad_stream;

        let estimate = simulate(&s, LAST_UPDATE + 3600).unwrap();
        let expected = simulate(&reference, LAST_UPDATE + 3600).unwrap();

        // 1 USDC/s for an hour, 10% share, on top of 2.5 unclaimed.
        assert_eq!(estimate.rewards.accrued, usdc("360"));
        assert_eq!(estimate.rewards.total, usdc("362.5"));
        assert_eq!(estimate.rewards.total.decimals, 6);
        assert_eq!(
            estimate.rewards.total.to_decimal(),
            expected.rewards.total.to_decimal()
        );
    }

    #[test]
    fn test_accrual_state_without_snapshot() {
        assert_eq!(accrual_state(None, 0), AccrualState::NoData);
    }

    #[test]
    fn test_rewards_earned_pricing() {
        let mut s = snapshot();
        s.platform_rewards = Some(stream(10));
        let estimate = simulate(&s, LAST_UPDATE + 3600).unwrap();

        let earned = estimate.to_rewards_earned(Some(Price::new(dec!(2))), None);
        assert_eq!(earned.rewards_usd, Some(dec!(720000)));
        assert_eq!(earned.platform_rewards.unwrap().format_units(), "3600");
        assert_eq!(earned.platform_rewards_usd, None);
        assert_eq!(earned.total_usd(), Some(dec!(720000)));

        let unpriced = estimate.to_rewards_earned(None, None);
        assert!(unpriced.rewards.is_some());
        assert_eq!(unpriced.rewards_usd, None);
    }

    proptest! {
        #[test]
        fn prop_total_is_monotone_in_now(
            rate in 0u64..u64::MAX,
            supply in 1u64..u64::MAX,
            balance in 0u64..u64::MAX,
            t1 in 0u64..2 * WEEK,
            dt in 0u64..2 * WEEK,
        ) {
            let mut s = snapshot();
            s.rewards.reward_rate = FixedPointAmount::wad(U256::from(rate));
            s.total_supply = FixedPointAmount::wad(U256::from(supply));
            s.staking_balance = FixedPointAmount::wad(U256::from(balance));

            let earlier = simulate(&s, LAST_UPDATE + t1).unwrap();
            let later = simulate(&s, LAST_UPDATE + t1 + dt).unwrap();
            prop_assert!(earlier.rewards.total.exact <= later.rewards.total.exact);
        }

        #[test]
        fn prop_frozen_past_period_finish(extra in 0u64..10 * WEEK) {
            let s = snapshot();
            let at_finish = simulate(&s, s.period_finish).unwrap();
            let later = simulate(&s, s.period_finish + extra).unwrap();
            prop_assert_eq!(at_finish.rewards, later.rewards);
        }
    }
}
