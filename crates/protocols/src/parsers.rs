//! Field parsers shared by the platform adapters.
//!
//! Subgraphs return most numbers as strings; these helpers turn them into
//! domain values and attach the pool address to any failure.

use crate::error::NormalizeError;
use earn_domain::value_objects::FixedPointAmount;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use std::str::FromStr;

pub(crate) fn parse_decimal(
    pool: &str,
    field: &'static str,
    value: &str,
) -> Result<Decimal, NormalizeError> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| NormalizeError::InvalidField {
            pool: pool.to_string(),
            field,
            value: value.to_string(),
        })
}

pub(crate) fn parse_amount(
    pool: &str,
    value: &str,
    decimals: u8,
) -> Result<FixedPointAmount, NormalizeError> {
    FixedPointAmount::parse_units(value, decimals).map_err(|source| NormalizeError::Amount {
        pool: pool.to_string(),
        source,
    })
}

/// Accepts token decimals as either `18` or `"18"`.
pub(crate) fn u8_from_str_or_int<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u8),
        Str(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Int(v) => Ok(v),
        Repr::Str(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("0xp", "swapFee", "0.003").unwrap(), dec!(0.003));
        assert_eq!(parse_decimal("0xp", "swapFee", "3e-3").unwrap(), dec!(0.003));
        assert!(matches!(
            parse_decimal("0xp", "swapFee", "n/a"),
            Err(NormalizeError::InvalidField { field: "swapFee", .. })
        ));
    }

    #[test]
    fn test_decimals_from_either_form() {
        #[derive(Deserialize)]
        struct T {
            #[serde(deserialize_with = "u8_from_str_or_int")]
            decimals: u8,
        }
        let a: T = serde_json::from_str(r#"{"decimals": 6}"#).unwrap();
        let b: T = serde_json::from_str(r#"{"decimals": "18"}"#).unwrap();
        assert_eq!(a.decimals, 6);
        assert_eq!(b.decimals, 18);
    }
}
