//! Aggregation of session data and chain snapshots into per-position view
//! models.
//!
//! Session data (pools, raw prices, contract metadata, APY baselines) is
//! fetched once. Snapshots arrive on every chain poll. The
//! [`EarnDataAggregator`] joins the two, tolerating partial inputs: a
//! missing snapshot yields [`EarnPosition::Loading`], a missing baseline
//! yields `ApyMetric::AwaitingData` and a missing price leaves USD fields
//! empty.

pub mod aggregator;
pub mod apy;
pub mod pricing;
pub mod session;
pub mod view;

pub use aggregator::{EarnDataAggregator, SnapshotMap, index_snapshots};
pub use pricing::PricedPools;
pub use session::{SessionData, SessionInput};
pub use view::{EarnPosition, LiveRewards, PositionMetrics};
