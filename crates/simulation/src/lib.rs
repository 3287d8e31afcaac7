//! Reward accrual simulation for staking-rewards positions.
//!
//! Between chain polls the claimable reward balance is extrapolated from the
//! latest snapshot and wall-clock time. See [`reward_accrual`] for the math.

/// Simulation errors.
pub mod error;
/// Convenient re-exports.
pub mod prelude;
/// Accrual state machine and per-stream extrapolation.
pub mod reward_accrual;

pub use error::SimulationError;
