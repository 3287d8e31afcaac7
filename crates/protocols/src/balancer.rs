//! Balancer weighted pools.
//!
//! Each token carries a denormalized weight; its share of pool value is
//! `denormWeight / totalWeight`. Pool shares (BPT) use 18 decimals.

use crate::error::NormalizeError;
use crate::parsers::{parse_amount, parse_decimal, u8_from_str_or_int};
use crate::{LP_TOKEN_DECIMALS, NormalizePool};
use earn_domain::entities::pool::{NormalizedPool, PoolExtras, PoolToken};
use earn_domain::enums::Platform;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancerTokenRecord {
    pub address: String,
    pub symbol: String,
    #[serde(deserialize_with = "u8_from_str_or_int")]
    pub decimals: u8,
    /// Reserve in whole tokens, e.g. `"1234.5"`.
    pub balance: String,
    pub denorm_weight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancerPoolRecord {
    pub address: String,
    pub tokens: Vec<BalancerTokenRecord>,
    pub total_weight: String,
    pub total_shares: String,
    pub total_swap_volume: String,
    pub swap_fee: String,
}

impl BalancerPoolRecord {
    /// floor(denormWeight / totalWeight * 100)
    fn ratio(&self, denorm_weight: Decimal, total_weight: Decimal) -> Result<u8, NormalizeError> {
        let invalid = |value: String| NormalizeError::InvalidField {
            pool: self.address.clone(),
            field: "denormWeight",
            value,
        };
        let ratio = denorm_weight
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|w| w.checked_div(total_weight))
            .ok_or_else(|| invalid(denorm_weight.to_string()))?
            .floor();
        ratio
            .to_u8()
            .filter(|r| *r <= 100)
            .ok_or_else(|| invalid(denorm_weight.to_string()))
    }
}

impl NormalizePool for BalancerPoolRecord {
    fn normalize(&self) -> Result<NormalizedPool, NormalizeError> {
        if self.tokens.len() < 2 {
            return Err(NormalizeError::TooFewTokens {
                pool: self.address.clone(),
                count: self.tokens.len(),
            });
        }

        let total_weight = parse_decimal(&self.address, "totalWeight", &self.total_weight)?;
        if total_weight <= Decimal::ZERO {
            return Err(NormalizeError::InvalidField {
                pool: self.address.clone(),
                field: "totalWeight",
                value: self.total_weight.clone(),
            });
        }

        let tokens = self
            .tokens
            .iter()
            .map(|t| {
                let weight = parse_decimal(&self.address, "denormWeight", &t.denorm_weight)?;
                Ok(PoolToken {
                    address: t.address.to_lowercase(),
                    decimals: t.decimals,
                    symbol: t.symbol.clone(),
                    liquidity: parse_amount(&self.address, &t.balance, t.decimals)?,
                    price: None,
                    ratio: self.ratio(weight, total_weight)?,
                })
            })
            .collect::<Result<Vec<_>, NormalizeError>>()?;

        Ok(NormalizedPool {
            address: self.address.to_lowercase(),
            platform: Platform::Balancer,
            tokens,
            total_supply: parse_amount(&self.address, &self.total_shares, LP_TOKEN_DECIMALS)?,
            extras: PoolExtras::Balancer {
                total_swap_volume: parse_decimal(
                    &self.address,
                    "totalSwapVolume",
                    &self.total_swap_volume,
                )?,
                swap_fee: parse_decimal(&self.address, "swapFee", &self.swap_fee)?,
            },
        })
    }
}
