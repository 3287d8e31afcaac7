//! Data fetched once per session.

use earn_domain::entities::{ApyBaseline, NormalizedPool, StakingRewardsContract};
use earn_domain::value_objects::PriceMap;
use earn_protocols::{RawPool, normalize_all};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Session input as delivered by the fetching layer: raw pool records
/// rather than normalized ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionInput {
    #[serde(default)]
    pub pools: Vec<RawPool>,
    /// Raw token prices in USD, keyed by token address.
    #[serde(default)]
    pub prices: PriceMap,
    #[serde(default)]
    pub contracts: Vec<StakingRewardsContract>,
    /// 24h baselines keyed by staking-rewards contract address.
    #[serde(default)]
    pub baselines: HashMap<String, ApyBaseline>,
}

/// Normalized pools, raw prices, contract metadata and APY baselines.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pools: Vec<NormalizedPool>,
    raw_prices: PriceMap,
    contracts: Vec<StakingRewardsContract>,
    baselines: HashMap<String, ApyBaseline>,
}

impl SessionData {
    pub fn new(pools: Vec<NormalizedPool>, raw_prices: PriceMap) -> Self {
        Self {
            pools,
            raw_prices,
            ..Self::default()
        }
    }

    /// Normalizes the raw pool records; records that fail are skipped.
    pub fn from_input(input: SessionInput) -> Self {
        let pools = normalize_all(&input.pools);
        let mut session = Self::new(pools, input.prices);
        for contract in input.contracts {
            session = session.with_contract(contract);
        }
        for (address, baseline) in input.baselines {
            session = session.with_baseline(&address, baseline);
        }
        info!(
            pools = session.pools.len(),
            contracts = session.contracts.len(),
            baselines = session.baselines.len(),
            "Session data loaded"
        );
        session
    }

    #[must_use]
    pub fn with_contract(mut self, contract: StakingRewardsContract) -> Self {
        self.contracts.push(contract);
        self
    }

    /// Sets the baseline for a contract, replacing any earlier one.
    #[must_use]
    pub fn with_baseline(mut self, contract: &str, baseline: ApyBaseline) -> Self {
        self.set_baseline(contract, baseline);
        self
    }

    pub fn set_baseline(&mut self, contract: &str, baseline: ApyBaseline) {
        self.baselines.insert(contract.to_lowercase(), baseline);
    }

    /// Adds fetched prices for tokens not priced yet.
    #[must_use]
    pub fn with_raw_prices(mut self, prices: &PriceMap) -> Self {
        self.raw_prices = self.raw_prices.extended_with(prices);
        self
    }

    /// Lower-cased addresses of every pool constituent, rewards token and
    /// platform token in the session, without duplicates.
    pub fn token_addresses(&self) -> Vec<String> {
        let pool_tokens = self
            .pools
            .iter()
            .flat_map(|p| p.tokens.iter().map(|t| t.address.as_str()));
        let reward_tokens = self.contracts.iter().flat_map(|c| {
            std::iter::once(c.rewards_token.address.as_str())
                .chain(c.platform_token.as_ref().map(|t| t.address.as_str()))
        });
        let mut addresses: Vec<String> = pool_tokens
            .chain(reward_tokens)
            .map(str::to_lowercase)
            .collect();
        addresses.sort();
        addresses.dedup();
        addresses
    }

    /// Addresses from [`Self::token_addresses`] without a raw price.
    pub fn unpriced_tokens(&self) -> Vec<String> {
        self.token_addresses()
            .into_iter()
            .filter(|a| !self.raw_prices.contains(a))
            .collect()
    }

    pub fn pools(&self) -> &[NormalizedPool] {
        &self.pools
    }

    pub fn raw_prices(&self) -> &PriceMap {
        &self.raw_prices
    }

    pub fn contracts(&self) -> &[StakingRewardsContract] {
        &self.contracts
    }

    pub fn contract(&self, address: &str) -> Option<&StakingRewardsContract> {
        self.contracts
            .iter()
            .find(|c| c.address.eq_ignore_ascii_case(address))
    }

    pub fn baseline(&self, contract: &str) -> Option<&ApyBaseline> {
        self.baselines.get(&contract.to_lowercase())
    }
}
