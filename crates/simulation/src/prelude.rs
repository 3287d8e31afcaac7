//! Prelude module for convenient imports.
//!
//! ```rust
//! use earn_simulation::prelude::*;
//! ```

pub use crate::error::SimulationError;
pub use crate::reward_accrual::{
    AccrualEstimate, StreamAccrual, accrual_state, reward_per_token, simulate,
};
