//! Collaborators that fetch data the engine does not own.
//!
//! Fetching, retries and caching live behind these traits. The in-memory
//! implementations serve file-driven runs and tests.

use crate::error::MonitorError;
use async_trait::async_trait;
use earn_domain::entities::{ApyBaseline, StakingRewardsContract};
use earn_domain::value_objects::PriceMap;
use std::collections::HashMap;

/// USD prices per token address.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Prices for as many of `addresses` as the source knows. Unknown
    /// addresses are left out rather than failing the batch.
    async fn prices(&self, addresses: &[String]) -> Result<PriceMap, MonitorError>;
}

/// Resolves the "24 hours ago" block and the values sampled there.
#[async_trait]
pub trait BaselineResolver: Send + Sync {
    async fn resolve(
        &self,
        contract: &StakingRewardsContract,
        now: u64,
    ) -> Result<ApyBaseline, MonitorError>;
}

/// A fixed price table.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    prices: PriceMap,
}

impl StaticPriceSource {
    pub fn new(prices: PriceMap) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn prices(&self, addresses: &[String]) -> Result<PriceMap, MonitorError> {
        Ok(addresses
            .iter()
            .filter_map(|a| self.prices.get(a).map(|p| (a.clone(), p)))
            .collect())
    }
}

/// Baselines known up front, keyed by contract address.
#[derive(Debug, Clone, Default)]
pub struct StaticBaselines {
    baselines: HashMap<String, ApyBaseline>,
}

impl StaticBaselines {
    pub fn new(baselines: HashMap<String, ApyBaseline>) -> Self {
        Self {
            baselines: baselines
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }
}

#[async_trait]
impl BaselineResolver for StaticBaselines {
    async fn resolve(
        &self,
        contract: &StakingRewardsContract,
        _now: u64,
    ) -> Result<ApyBaseline, MonitorError> {
        self.baselines
            .get(&contract.address.to_lowercase())
            .cloned()
            .ok_or_else(|| MonitorError::Baseline {
                contract: contract.address.clone(),
                reason: "no baseline recorded".to_string(),
            })
    }
}
