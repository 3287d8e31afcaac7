use earn_domain::AmountError;
use thiserror::Error;

/// Failure while extrapolating a reward stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("{stream} stream of {contract}: {source}")]
    Arithmetic {
        contract: String,
        stream: &'static str,
        #[source]
        source: AmountError,
    },
}
