//! One-way price pipeline: raw token prices → priced pools → LP prices.
//!
//! The raw map is only read. Derived LP prices land in a new map that
//! consumers see merged with the raw one.

use earn_domain::entities::NormalizedPool;
use earn_domain::metrics::{attach_prices, derive_lp_prices};
use earn_domain::value_objects::PriceMap;
use serde::Serialize;
use tracing::debug;

/// Pools with constituent prices attached, and every known price.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PricedPools {
    pub pools: Vec<NormalizedPool>,
    /// Raw prices plus derived LP prices. Raw entries win on conflict.
    pub prices: PriceMap,
}

impl PricedPools {
    pub fn build(raw: &PriceMap, pools: &[NormalizedPool]) -> Self {
        let derived = derive_lp_prices(raw, pools);
        let prices = raw.extended_with(&derived);
        let pools = pools.iter().map(|p| attach_prices(p, &prices)).collect();
        debug!(
            raw = raw.len(),
            derived = derived.len(),
            "Built price pipeline"
        );
        Self { pools, prices }
    }

    pub fn pool(&self, address: &str) -> Option<&NormalizedPool> {
        self.pools
            .iter()
            .find(|p| p.address.eq_ignore_ascii_case(address))
    }
}
