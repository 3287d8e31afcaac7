use earn_domain::AmountError;
use thiserror::Error;

/// Reasons a raw pool record cannot be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("pool {pool} has {count} tokens, need at least 2")]
    TooFewTokens { pool: String, count: usize },

    #[error("pool {pool}: invalid {field} {value:?}")]
    InvalidField {
        pool: String,
        field: &'static str,
        value: String,
    },

    #[error("pool {pool}: {source}")]
    Amount {
        pool: String,
        #[source]
        source: AmountError,
    },
}
