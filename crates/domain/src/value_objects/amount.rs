//! Scaled-integer token amounts.
//!
//! A [`FixedPointAmount`] stores an exact `U256` together with the number of
//! decimals it is scaled by, mirroring how ERC-20 balances and reward
//! accumulators are kept on-chain. Arithmetic never silently changes the
//! scale: every operation either keeps the left operand's decimals or says
//! which scale it returns.

use crate::errors::AmountError;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Decimals used by on-chain reward accumulators and most ERC-20 tokens.
pub const WAD_DECIMALS: u8 = 18;

/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const DECIMAL_MANTISSA_MAX: U256 = U256([u64::MAX, 0xFFFF_FFFF, 0, 0]);

/// Largest scale a `Decimal` accepts.
const DECIMAL_MAX_SCALE: u32 = 28;

/// Returns `10^exponent` as a `U256`.
pub fn pow10(exponent: u8) -> Result<U256, AmountError> {
    U256::from(10u8)
        .checked_pow(U256::from(exponent))
        .ok_or(AmountError::Overflow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedPointAmount {
    #[serde(with = "u256_dec_str")]
    pub exact: U256,
    pub decimals: u8,
}

impl FixedPointAmount {
    pub fn new(exact: U256, decimals: u8) -> Self {
        Self { exact, decimals }
    }

    /// Wraps an already 1e18-scaled value.
    pub fn wad(exact: impl Into<U256>) -> Self {
        Self::new(exact.into(), WAD_DECIMALS)
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(U256::zero(), decimals)
    }

    /// Builds `units` whole tokens, e.g. `whole(1000, 18)` is `1000e18` exact.
    pub fn whole(units: u128, decimals: u8) -> Result<Self, AmountError> {
        let exact = U256::from(units)
            .checked_mul(pow10(decimals)?)
            .ok_or(AmountError::Overflow)?;
        Ok(Self::new(exact, decimals))
    }

    pub fn is_zero(&self) -> bool {
        self.exact.is_zero()
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, AmountError> {
        self.ensure_same_scale(other)?;
        let exact = self
            .exact
            .checked_add(other.exact)
            .ok_or(AmountError::Overflow)?;
        Ok(Self::new(exact, self.decimals))
    }

    /// Subtracts `other`, clamping at zero.
    pub fn saturating_sub(&self, other: &Self) -> Result<Self, AmountError> {
        self.ensure_same_scale(other)?;
        Ok(Self::new(self.exact.saturating_sub(other.exact), self.decimals))
    }

    pub fn checked_mul_u64(&self, factor: u64) -> Result<Self, AmountError> {
        let exact = self
            .exact
            .checked_mul(U256::from(factor))
            .ok_or(AmountError::Overflow)?;
        Ok(Self::new(exact, self.decimals))
    }

    /// `self * other / 10^other.decimals`, truncated. Keeps `self.decimals`.
    ///
    /// With both operands at 1e18 this is the ledger's
    /// `balance.mulTruncate(delta)`.
    pub fn mul_truncate(&self, other: &Self) -> Result<Self, AmountError> {
        let product = self
            .exact
            .checked_mul(other.exact)
            .ok_or(AmountError::Overflow)?;
        Ok(Self::new(product / pow10(other.decimals)?, self.decimals))
    }

    /// `self * 10^other.decimals / other`, truncated. Keeps `self.decimals`.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::DivisionByZero`] when `other` is zero.
    pub fn div_precise(&self, other: &Self) -> Result<Self, AmountError> {
        if other.exact.is_zero() {
            return Err(AmountError::DivisionByZero);
        }
        let scaled = self
            .exact
            .checked_mul(pow10(other.decimals)?)
            .ok_or(AmountError::Overflow)?;
        Ok(Self::new(scaled / other.exact, self.decimals))
    }

    /// Re-expresses the amount at `decimals`, truncating when scaling down.
    pub fn rescale(&self, decimals: u8) -> Result<Self, AmountError> {
        let exact = match decimals.cmp(&self.decimals) {
            Ordering::Equal => self.exact,
            Ordering::Greater => self
                .exact
                .checked_mul(pow10(decimals - self.decimals)?)
                .ok_or(AmountError::Overflow)?,
            Ordering::Less => self.exact / pow10(self.decimals - decimals)?,
        };
        Ok(Self::new(exact, decimals))
    }

    /// Compares the represented values, regardless of scale.
    pub fn compare(&self, other: &Self) -> Ordering {
        match self.decimals.cmp(&other.decimals) {
            Ordering::Equal => self.exact.cmp(&other.exact),
            Ordering::Less => match other.lift(self) {
                Some(upscaled) => upscaled.cmp(&other.exact),
                None => Ordering::Greater,
            },
            Ordering::Greater => match self.lift(other) {
                Some(upscaled) => self.exact.cmp(&upscaled),
                None => Ordering::Less,
            },
        }
    }

    /// Lifts `lower` to `self.decimals`; `None` when that overflows, meaning
    /// `lower` is larger than anything `self` can represent.
    fn lift(&self, lower: &Self) -> Option<U256> {
        lower.rescale(self.decimals).ok().map(|a| a.exact)
    }

    /// Parses a decimal string such as `"1234.5678"` at the given decimals.
    ///
    /// Fraction digits beyond `decimals` are truncated. Scientific notation
    /// is accepted through `Decimal`.
    pub fn parse_units(input: &str, decimals: u8) -> Result<Self, AmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Parse(input.to_string()));
        }
        if trimmed.starts_with('-') {
            return Err(AmountError::Negative);
        }
        if trimmed.contains(['e', 'E']) {
            let d = Decimal::from_scientific(trimmed)
                .map_err(|_| AmountError::Parse(input.to_string()))?;
            return Self::from_decimal(d, decimals);
        }

        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(AmountError::Parse(input.to_string()));
        }

        let scale = usize::from(decimals);
        let mut digits = String::with_capacity(int_part.len() + scale);
        digits.push_str(int_part);
        if frac_part.len() >= scale {
            digits.push_str(&frac_part[..scale]);
        } else {
            digits.push_str(frac_part);
            digits.extend(std::iter::repeat_n('0', scale - frac_part.len()));
        }
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Self::zero(decimals));
        }
        let exact = U256::from_dec_str(digits).map_err(|_| AmountError::Overflow)?;
        Ok(Self::new(exact, decimals))
    }

    /// Formats the simple value without trailing zeros, e.g. `"3.6"`.
    pub fn format_units(&self) -> String {
        let raw = self.exact.to_string();
        let scale = usize::from(self.decimals);
        if scale == 0 {
            return raw;
        }
        let padded = if raw.len() <= scale {
            format!("{}{}", "0".repeat(scale - raw.len() + 1), raw)
        } else {
            raw
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{int_part}.{frac_part}")
        }
    }

    /// Converts to `Decimal`. Low-order digits are dropped when the exact
    /// value does not fit a 96-bit mantissa; saturates at `Decimal::MAX`.
    pub fn to_decimal(&self) -> Decimal {
        let mut raw = self.exact;
        let mut scale = u32::from(self.decimals);
        while scale > DECIMAL_MAX_SCALE || (raw > DECIMAL_MANTISSA_MAX && scale > 0) {
            raw /= U256::from(10u8);
            scale -= 1;
        }
        if raw > DECIMAL_MANTISSA_MAX {
            return Decimal::MAX;
        }
        Decimal::from_i128_with_scale(raw.low_u128() as i128, scale)
    }

    pub fn from_decimal(d: Decimal, decimals: u8) -> Result<Self, AmountError> {
        if d.is_sign_negative() && !d.is_zero() {
            return Err(AmountError::Negative);
        }
        let mantissa = U256::from(d.mantissa().unsigned_abs());
        let scale = d.scale();
        let target = u32::from(decimals);
        let exact = if scale > target {
            let drop = u8::try_from(scale - target).map_err(|_| AmountError::Overflow)?;
            mantissa / pow10(drop)?
        } else {
            let lift = u8::try_from(target - scale).map_err(|_| AmountError::Overflow)?;
            mantissa
                .checked_mul(pow10(lift)?)
                .ok_or(AmountError::Overflow)?
        };
        Ok(Self::new(exact, decimals))
    }

    fn ensure_same_scale(&self, other: &Self) -> Result<(), AmountError> {
        if self.decimals != other.decimals {
            return Err(AmountError::DecimalsMismatch {
                left: self.decimals,
                right: other.decimals,
            });
        }
        Ok(())
    }
}

impl fmt::Display for FixedPointAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_units())
    }
}

/// Serializes `U256` as a base-10 string, the way subgraphs and JSON-RPC
/// decoders hand out big integers.
mod u256_dec_str {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(s.trim()).map_err(|e| D::Error::custom(format!("{e:?}")))
    }
}
