//! Uniswap v2 pairs: two tokens, always a 50/50 value split.

use crate::error::NormalizeError;
use crate::parsers::{parse_amount, parse_decimal, u8_from_str_or_int};
use crate::{LP_TOKEN_DECIMALS, NormalizePool};
use earn_domain::entities::pool::{NormalizedPool, PoolExtras, PoolToken};
use earn_domain::enums::Platform;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniswapTokenRecord {
    pub id: String,
    pub symbol: String,
    #[serde(deserialize_with = "u8_from_str_or_int")]
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniswapPairRecord {
    pub id: String,
    pub token0: UniswapTokenRecord,
    pub token1: UniswapTokenRecord,
    /// Reserves in whole tokens.
    pub reserve0: String,
    pub reserve1: String,
    pub total_supply: String,
    #[serde(rename = "reserveUSD")]
    pub reserve_usd: String,
    #[serde(rename = "volumeUSD", default)]
    pub volume_usd: Option<String>,
}

const UNISWAP_RATIO: u8 = 50;

impl NormalizePool for UniswapPairRecord {
    fn normalize(&self) -> Result<NormalizedPool, NormalizeError> {
        let token = |record: &UniswapTokenRecord, reserve: &str| -> Result<PoolToken, NormalizeError> {
            Ok(PoolToken {
                address: record.id.to_lowercase(),
                decimals: record.decimals,
                symbol: record.symbol.clone(),
                liquidity: parse_amount(&self.id, reserve, record.decimals)?,
                price: None,
                ratio: UNISWAP_RATIO,
            })
        };

        let total_volume_usd = self
            .volume_usd
            .as_deref()
            .map(|v| parse_decimal(&self.id, "volumeUSD", v))
            .transpose()?;

        Ok(NormalizedPool {
            address: self.id.to_lowercase(),
            platform: Platform::Uniswap,
            tokens: vec![
                token(&self.token0, &self.reserve0)?,
                token(&self.token1, &self.reserve1)?,
            ],
            total_supply: parse_amount(&self.id, &self.total_supply, LP_TOKEN_DECIMALS)?,
            extras: PoolExtras::Uniswap {
                reserve_usd: parse_decimal(&self.id, "reserveUSD", &self.reserve_usd)?,
                total_volume_usd,
            },
        })
    }
}
