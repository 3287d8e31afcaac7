pub mod amount;
pub mod price;

pub use amount::{FixedPointAmount, WAD_DECIMALS};
pub use price::{Price, PriceMap};
