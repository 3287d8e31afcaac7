use thiserror::Error;

/// Failures of fixed-point arithmetic on [`crate::value_objects::amount::FixedPointAmount`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("fixed-point arithmetic overflowed U256")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("decimals mismatch: {left} vs {right}")]
    DecimalsMismatch { left: u8, right: u8 },

    #[error("cannot parse amount: {0:?}")]
    Parse(String),

    #[error("amount cannot be negative")]
    Negative,
}

/// Failures while deriving yield or valuation metrics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("elapsed window must be positive")]
    ZeroElapsed,

    #[error("window start {start} is after now {now}")]
    WindowInFuture { start: u64, now: u64 },

    #[error("decimal overflow while computing {0}")]
    DecimalOverflow(&'static str),
}
