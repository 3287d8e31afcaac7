pub mod apy;
pub mod lp_value;

pub use apy::{ApyMetric, SECONDS_PER_DAY, SECONDS_PER_YEAR, annualize, annualize_over};
pub use lp_value::{attach_prices, derive_lp_prices, lp_fair_price, pool_value_usd};
