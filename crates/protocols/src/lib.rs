//! Platform adapters that turn raw subgraph/API pool records into
//! [`NormalizedPool`]s.
//!
//! Every supported AMM reports its pools differently. Each adapter maps its
//! record onto the common shape: per-token reserves at native precision, a
//! value-weight `ratio` per token, total LP supply and the platform fields
//! later needed for APY.

pub mod balancer;
pub mod curve;
pub mod error;
pub(crate) mod parsers;
pub mod uniswap;

pub use balancer::{BalancerPoolRecord, BalancerTokenRecord};
pub use curve::{CurveCoinRecord, CurvePoolRecord};
pub use error::NormalizeError;
pub use uniswap::{UniswapPairRecord, UniswapTokenRecord};

use earn_domain::entities::pool::NormalizedPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// LP shares (BPT, UNI-V2, Curve LP) all use 18 decimals.
pub const LP_TOKEN_DECIMALS: u8 = 18;

/// Maps one platform record onto the common pool shape.
pub trait NormalizePool {
    fn normalize(&self) -> Result<NormalizedPool, NormalizeError>;
}

/// A pool record from any supported platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum RawPool {
    Balancer(BalancerPoolRecord),
    Uniswap(UniswapPairRecord),
    Curve(CurvePoolRecord),
}

impl NormalizePool for RawPool {
    fn normalize(&self) -> Result<NormalizedPool, NormalizeError> {
        let pool = match self {
            RawPool::Balancer(r) => r.normalize()?,
            RawPool::Uniswap(r) => r.normalize()?,
            RawPool::Curve(r) => r.normalize()?,
        };
        if !pool.has_valid_shape() {
            warn!(
                pool = %pool.address,
                ratio_sum = pool.ratio_sum(),
                "Normalized pool ratios fall outside rounding tolerance"
            );
        }
        Ok(pool)
    }
}

/// Normalizes every record, dropping the ones that fail.
///
/// A single malformed record should not blank out the rest of the dashboard,
/// so failures are logged and skipped.
pub fn normalize_all(records: &[RawPool]) -> Vec<NormalizedPool> {
    let pools: Vec<NormalizedPool> = records
        .iter()
        .filter_map(|record| match record.normalize() {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(error = %e, "Skipping pool record");
                None
            }
        })
        .collect();
    debug!(
        received = records.len(),
        normalized = pools.len(),
        "Normalized pool records"
    );
    pools
}
