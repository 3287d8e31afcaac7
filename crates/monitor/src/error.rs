use thiserror::Error;

/// Errors raised by the live monitoring layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("contract {0} is not part of the session")]
    UnknownContract(String),

    #[error("snapshot for {actual} published on the {expected} channel")]
    SnapshotMismatch { expected: String, actual: String },

    #[error("baseline resolution failed for {contract}: {reason}")]
    Baseline { contract: String, reason: String },
}
