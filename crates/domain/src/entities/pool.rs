use crate::enums::Platform;
use crate::value_objects::amount::FixedPointAmount;
use crate::value_objects::price::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One constituent of a [`NormalizedPool`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolToken {
    pub address: String,
    pub decimals: u8,
    pub symbol: String,
    /// Pool reserve of this token, at the token's decimals.
    pub liquidity: FixedPointAmount,
    /// USD price, once attached from a price map.
    pub price: Option<Price>,
    /// Share of pool value targeted for this token, 0-100.
    pub ratio: u8,
}

/// Fields only some platforms report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum PoolExtras {
    Balancer {
        /// Cumulative swap volume in USD since pool creation.
        total_swap_volume: Decimal,
        /// Swap fee as a fraction, e.g. `0.003`.
        swap_fee: Decimal,
    },
    Uniswap {
        reserve_usd: Decimal,
        /// Cumulative volume in USD, when the source reports it.
        total_volume_usd: Option<Decimal>,
    },
    Curve {
        virtual_price: Option<Decimal>,
        /// APY computed upstream by the Curve integration, as a fraction.
        external_apy: Option<Decimal>,
    },
}

/// A pool record from any supported AMM, in one schema.
///
/// Invariants: at least two tokens, and ratios summing to 100 within a
/// rounding tolerance of `tokens.len() - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPool {
    pub address: String,
    pub platform: Platform,
    pub tokens: Vec<PoolToken>,
    /// Outstanding LP tokens.
    pub total_supply: FixedPointAmount,
    pub extras: PoolExtras,
}

impl NormalizedPool {
    pub fn ratio_sum(&self) -> u32 {
        self.tokens.iter().map(|t| u32::from(t.ratio)).sum()
    }

    /// Checks the token-count and ratio-sum invariants.
    pub fn has_valid_shape(&self) -> bool {
        if self.tokens.len() < 2 {
            return false;
        }
        let tolerance = (self.tokens.len() - 1) as u32;
        let sum = self.ratio_sum();
        sum <= 100 && 100 - sum <= tolerance
    }

    /// True once every constituent carries a price.
    pub fn is_fully_priced(&self) -> bool {
        self.tokens.iter().all(|t| t.price.is_some())
    }
}
