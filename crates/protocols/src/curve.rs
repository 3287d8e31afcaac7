//! Curve stable-swap pools.
//!
//! Coins are held in roughly equal value, so each gets `floor(100 / n)`.
//! The Curve integration also reports an APY computed upstream; it is
//! carried through untouched.

use crate::error::NormalizeError;
use crate::parsers::{parse_amount, parse_decimal, u8_from_str_or_int};
use crate::{LP_TOKEN_DECIMALS, NormalizePool};
use earn_domain::entities::pool::{NormalizedPool, PoolExtras, PoolToken};
use earn_domain::enums::Platform;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveCoinRecord {
    pub address: String,
    pub symbol: String,
    #[serde(deserialize_with = "u8_from_str_or_int")]
    pub decimals: u8,
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoolRecord {
    pub address: String,
    pub coins: Vec<CurveCoinRecord>,
    pub total_supply: String,
    #[serde(default)]
    pub virtual_price: Option<String>,
    /// Yield fraction computed by the Curve integration.
    #[serde(default)]
    pub apy: Option<String>,
}

impl NormalizePool for CurvePoolRecord {
    fn normalize(&self) -> Result<NormalizedPool, NormalizeError> {
        let count = self.coins.len();
        if count < 2 {
            return Err(NormalizeError::TooFewTokens {
                pool: self.address.clone(),
                count,
            });
        }
        let ratio = u8::try_from(100 / count).unwrap_or(0);

        let tokens = self
            .coins
            .iter()
            .map(|c| {
                Ok(PoolToken {
                    address: c.address.to_lowercase(),
                    decimals: c.decimals,
                    symbol: c.symbol.clone(),
                    liquidity: parse_amount(&self.address, &c.balance, c.decimals)?,
                    price: None,
                    ratio,
                })
            })
            .collect::<Result<Vec<_>, NormalizeError>>()?;

        let optional = |field: &'static str, value: &Option<String>| {
            value
                .as_deref()
                .map(|v| parse_decimal(&self.address, field, v))
                .transpose()
        };

        Ok(NormalizedPool {
            address: self.address.to_lowercase(),
            platform: Platform::Curve,
            tokens,
            total_supply: parse_amount(&self.address, &self.total_supply, LP_TOKEN_DECIMALS)?,
            extras: PoolExtras::Curve {
                virtual_price: optional("virtualPrice", &self.virtual_price)?,
                external_apy: optional("apy", &self.apy)?,
            },
        })
    }
}
