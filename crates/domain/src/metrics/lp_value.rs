//! Fair value of pool-ownership tokens.
//!
//! An LP token has no market of its own, but each unit is a claim on a
//! slice of the pool's reserves. Without arbitrage the token is worth its
//! backing: total reserve value divided by outstanding supply.

use crate::entities::pool::NormalizedPool;
use crate::value_objects::price::{Price, PriceMap};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Total USD value of the pool reserves.
///
/// `None` if any constituent is unpriced or the sum overflows.
pub fn pool_value_usd(pool: &NormalizedPool) -> Option<Decimal> {
    pool.tokens.iter().try_fold(Decimal::ZERO, |acc, token| {
        let value = token.price?.value_of(&token.liquidity)?;
        acc.checked_add(value)
    })
}

/// Backing value of one LP unit: Σ(liquidity × price) ÷ total supply.
///
/// Returns `None` when a price is missing or the supply is zero.
pub fn lp_fair_price(pool: &NormalizedPool) -> Option<Price> {
    if pool.total_supply.is_zero() {
        return None;
    }
    let supply = pool.total_supply.to_decimal();
    if supply.is_zero() {
        return None;
    }
    let value = pool_value_usd(pool)?;
    value.checked_div(supply).map(Price::new)
}

/// Returns a copy of `pool` with token prices filled from `prices`.
///
/// Prices already on the pool are kept.
pub fn attach_prices(pool: &NormalizedPool, prices: &PriceMap) -> NormalizedPool {
    let mut priced = pool.clone();
    for token in &mut priced.tokens {
        if token.price.is_none() {
            token.price = prices.get(&token.address);
        }
    }
    priced
}

/// Derives LP token prices for `pools` from `raw` token prices.
///
/// The result holds only the derived entries; `raw` is never modified.
/// Combine with [`PriceMap::extended_with`] to hand consumers one map.
pub fn derive_lp_prices(raw: &PriceMap, pools: &[NormalizedPool]) -> PriceMap {
    let mut derived = PriceMap::new();
    for pool in pools {
        let priced = attach_prices(pool, raw);
        match lp_fair_price(&priced) {
            Some(price) => {
                debug!(pool = %pool.address, price = %price.value, "Derived LP price");
                derived.insert(&pool.address, price);
            }
            None => {
                warn!(
                    pool = %pool.address,
                    priced = priced.is_fully_priced(),
                    "Cannot derive LP price"
                );
            }
        }
    }
    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::pool::{PoolExtras, PoolToken};
    use crate::enums::Platform;
    use crate::value_objects::amount::FixedPointAmount;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn pool_token(address: &str, decimals: u8, amount: &str, price: Option<Decimal>) -> PoolToken {
        PoolToken {
            address: address.to_string(),
            decimals,
            symbol: address.to_string(),
            liquidity: FixedPointAmount::parse_units(amount, decimals).unwrap(),
            price: price.map(Price::new),
            ratio: 50,
        }
    }

    fn usdc_weth_pair(usdc_price: Option<Decimal>) -> NormalizedPool {
        NormalizedPool {
            address: "0xpair".to_string(),
            platform: Platform::Uniswap,
            tokens: vec![
                pool_token("0xusdc", 6, "500000", usdc_price),
                pool_token("0xweth", 18, "500", Some(dec!(1000))),
            ],
            total_supply: FixedPointAmount::parse_units("1000", 18).unwrap(),
            extras: PoolExtras::Uniswap {
                reserve_usd: dec!(1_000_000),
                total_volume_usd: None,
            },
        }
    }

    #[test]
    fn test_uniswap_pair_fair_price() {
        let pool = usdc_weth_pair(Some(dec!(1)));
        assert_eq!(pool_value_usd(&pool), Some(dec!(1_000_000)));
        assert_eq!(lp_fair_price(&pool), Some(Price::new(dec!(1000))));
    }

    #[test]
    fn test_missing_price_is_absent() {
        let pool = usdc_weth_pair(None);
        assert_eq!(pool_value_usd(&pool), None);
        assert_eq!(lp_fair_price(&pool), None);
    }

    #[test]
    fn test_zero_supply_is_absent() {
        let mut pool = usdc_weth_pair(Some(dec!(1)));
        pool.total_supply = FixedPointAmount::zero(18);
        assert_eq!(lp_fair_price(&pool), None);
    }

    #[test]
    fn test_token_order_does_not_matter() {
        let pool = usdc_weth_pair(Some(dec!(1)));
        let mut reversed = pool.clone();
        reversed.tokens.reverse();
        assert_eq!(lp_fair_price(&pool), lp_fair_price(&reversed));
    }

    #[test]
    fn test_derive_lp_prices_leaves_raw_untouched() {
        let pool = usdc_weth_pair(None);
        let raw: PriceMap = [
            ("0xusdc".to_string(), Price::new(dec!(1))),
            ("0xweth".to_string(), Price::new(dec!(1000))),
        ]
        .into_iter()
        .collect();
        let snapshot = raw.clone();

        let derived = derive_lp_prices(&raw, &[pool]);
        assert_eq!(raw, snapshot);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived.get("0xPAIR"), Some(Price::new(dec!(1000))));

        let combined = raw.extended_with(&derived);
        assert_eq!(combined.len(), 3);
    }

    #[test]
    fn test_attach_prices_keeps_existing() {
        let pool = usdc_weth_pair(Some(dec!(0.99)));
        let raw: PriceMap = [("0xusdc".to_string(), Price::new(dec!(1)))]
            .into_iter()
            .collect();
        let priced = attach_prices(&pool, &raw);
        assert_eq!(priced.tokens[0].price, Some(Price::new(dec!(0.99))));
    }

    proptest! {
        #[test]
        fn prop_fair_price_commutative(
            amounts in proptest::collection::vec((1u64..1_000_000_000, 1u32..100_000), 2..6),
            rotate in 0usize..6,
        ) {
            let tokens: Vec<PoolToken> = amounts
                .iter()
                .enumerate()
                .map(|(i, (amount, cents))| PoolToken {
                    address: format!("0x{i}"),
                    decimals: 18,
                    symbol: format!("T{i}"),
                    liquidity: FixedPointAmount::whole(u128::from(*amount), 18).unwrap(),
                    price: Some(Price::new(Decimal::new(i64::from(*cents), 2))),
                    ratio: 0,
                })
                .collect();
            let mut pool = usdc_weth_pair(Some(dec!(1)));
            pool.tokens = tokens;
            pool.total_supply = FixedPointAmount::whole(1_000, 18).unwrap();

            let mut shuffled = pool.clone();
            let n = shuffled.tokens.len();
            shuffled.tokens.rotate_left(rotate % n);
            shuffled.tokens.swap(0, n - 1);

            prop_assert_eq!(lp_fair_price(&pool), lp_fair_price(&shuffled));
        }
    }
}
