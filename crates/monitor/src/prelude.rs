//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use earn_monitor::prelude::*;
//! ```

// Clock
pub use crate::clock::{Clock, FixedClock, SystemClock};

// Config
pub use crate::config::{MonitorConfig, TICK_INTERVAL_ENV};

// Errors
pub use crate::error::MonitorError;

// Scheduler
pub use crate::scheduler::{RewardsTick, RewardsTicker, TickerHandle};

// Session
pub use crate::session::EarnSession;

// Sources
pub use crate::sources::{BaselineResolver, PriceSource, StaticBaselines, StaticPriceSource};

// Sync
pub use crate::sync::{SnapshotPublisher, SnapshotStore};
