//! Domain model for the earn analytics engine.
//!
//! This crate holds the types every other crate shares:
//! - Exact fixed-point token amounts
//! - USD prices and price maps
//! - Normalized AMM pools and staking-rewards entities
//! - LP fair-value pricing and yield annualization

/// Domain entities.
pub mod entities;
/// Enumerations shared across crates.
pub mod enums;
/// Error types.
pub mod errors;
/// Valuation and yield metrics.
pub mod metrics;
/// Value objects.
pub mod value_objects;

pub use errors::{AmountError, MetricsError};
