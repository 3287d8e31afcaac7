//! Terminal rendering of positions and ticks.

use earn_aggregator::{EarnPosition, PositionMetrics};
use earn_domain::enums::AccrualState;
use earn_domain::metrics::ApyMetric;
use earn_domain::value_objects::FixedPointAmount;
use earn_monitor::scheduler::RewardsTick;
use prettytable::{Table, row};
use rust_decimal::Decimal;

const MISSING: &str = "-";

pub fn usd(value: Option<Decimal>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("${:.2}", v))
}

pub fn amount(value: Option<FixedPointAmount>, symbol: &str) -> String {
    value.map_or_else(
        || MISSING.to_string(),
        |a| format!("{:.4} {}", a.to_decimal(), symbol),
    )
}

pub fn apy(metric: &ApyMetric) -> String {
    match metric {
        ApyMetric::AwaitingData => "awaiting data".to_string(),
        ApyMetric::Measured { .. } => format!("{:.2}%", metric.as_percentage().unwrap_or_default()),
        ApyMetric::External { .. } => {
            format!("{:.2}% (ext)", metric.as_percentage().unwrap_or_default())
        }
    }
}

pub fn state(state: AccrualState) -> &'static str {
    match state {
        AccrualState::NoData => "no data",
        AccrualState::Idle => "idle",
        AccrualState::Accruing => "accruing",
        AccrualState::PeriodEnded => "period ended",
    }
}

/// Compact duration, e.g. `3d 4h` or `12m 5s`.
pub fn remaining(seconds: u64) -> String {
    let (days, hours) = (seconds / 86_400, (seconds % 86_400) / 3600);
    let (minutes, secs) = ((seconds % 3600) / 60, seconds % 60);
    match (days, hours, minutes) {
        (0, 0, 0) => format!("{secs}s"),
        (0, 0, _) => format!("{minutes}m {secs}s"),
        (0, _, _) => format!("{hours}h {minutes}m"),
        _ => format!("{days}d {hours}h"),
    }
}

fn rewards_cell(m: &PositionMetrics) -> String {
    let earned = &m.rewards_earned;
    let mut cell = amount(earned.rewards, &m.contract.rewards_token.symbol);
    if let Some(platform) = &m.contract.platform_token {
        cell.push('\n');
        cell.push_str(&amount(earned.platform_rewards, &platform.symbol));
    }
    cell
}

pub fn positions_table(positions: &[EarnPosition]) -> Table {
    let mut table = Table::new();
    table.set_titles(row![
        "Contract",
        "State",
        "Rewards",
        "Rewards USD",
        "Staked USD",
        "Share",
        "Rewards APY",
        "Staking APY",
        "Period left"
    ]);

    for position in positions {
        match position {
            EarnPosition::Loading { contract } => {
                table.add_row(row![
                    contract.title, "loading", MISSING, MISSING, MISSING, MISSING, MISSING,
                    MISSING, MISSING
                ]);
            }
            EarnPosition::Ready(m) => {
                let share = m
                    .pool_share
                    .map_or_else(|| MISSING.to_string(), |s| format!("{:.4}%", s * Decimal::ONE_HUNDRED));
                table.add_row(row![
                    m.contract.title,
                    state(m.state),
                    rewards_cell(m),
                    usd(m.rewards_earned.total_usd()),
                    usd(m.staked_value_usd),
                    share,
                    apy(&m.combined_rewards_tokens_apy),
                    apy(&m.staking_token_apy),
                    remaining(m.seconds_remaining)
                ]);
            }
        }
    }
    table
}

pub fn tick_line(tick: &RewardsTick, title: &str) -> String {
    let at = chrono::DateTime::from_timestamp(i64::try_from(tick.now).unwrap_or(i64::MAX), 0)
        .unwrap_or_default();
    let earned = &tick.rewards.rewards_earned;
    format!(
        "{} | {:<20} | {:<12} | {:>16} | {:>12} | {}",
        at.format("%H:%M:%S"),
        title,
        state(tick.rewards.state),
        earned
            .rewards
            .map_or_else(|| MISSING.to_string(), |a| format!("{:.6}", a.to_decimal())),
        usd(earned.total_usd()),
        remaining(tick.rewards.seconds_remaining)
    )
}
