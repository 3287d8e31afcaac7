use crate::errors::MetricsError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 365 days, no leap-year adjustment.
pub const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// An annualized yield, or the reason there is none yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApyMetric {
    /// The 24h baseline (or a price it needs) has not arrived.
    AwaitingData,
    /// Measured from the 24h window, as a fraction (0.12 = 12%).
    Measured { value: Decimal },
    /// Supplied by an external integration, as a fraction.
    External { value: Decimal },
}

impl ApyMetric {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            ApyMetric::AwaitingData => None,
            ApyMetric::Measured { value } | ApyMetric::External { value } => Some(*value),
        }
    }

    pub fn as_percentage(&self) -> Option<Decimal> {
        self.value().and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED))
    }

    pub fn is_awaiting_data(&self) -> bool {
        matches!(self, ApyMetric::AwaitingData)
    }
}

/// Scales an increase observed over `elapsed_seconds` to one year.
///
/// formula: increase * (SECONDS_PER_YEAR / elapsed_seconds)
pub fn annualize_over(increase: Decimal, elapsed_seconds: u64) -> Result<Decimal, MetricsError> {
    if elapsed_seconds == 0 {
        return Err(MetricsError::ZeroElapsed);
    }
    let factor = Decimal::from(SECONDS_PER_YEAR) / Decimal::from(elapsed_seconds);
    increase
        .checked_mul(factor)
        .ok_or(MetricsError::DecimalOverflow("annualized yield"))
}

/// Annualizes an increase measured from `window_start` until `now`
/// (both unix seconds).
///
/// # Errors
///
/// `WindowInFuture` when `window_start > now`, `ZeroElapsed` when they match.
pub fn annualize(increase: Decimal, window_start: u64, now: u64) -> Result<Decimal, MetricsError> {
    if window_start > now {
        return Err(MetricsError::WindowInFuture {
            start: window_start,
            now,
        });
    }
    annualize_over(increase, now - window_start)
}
