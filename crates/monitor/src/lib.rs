//! Live monitoring of staking-rewards positions.
//!
//! Two independent timing domains meet here:
//! - the chain-poll domain, which pushes fresh snapshots into the
//!   [`SnapshotStore`](sync::SnapshotStore)
//! - the display-tick domain, where a
//!   [`RewardsTicker`](scheduler::RewardsTicker) re-derives claimable
//!   rewards from the latest snapshot on a fixed interval
//!
//! [`EarnSession`](session::EarnSession) wires both to the aggregator.

/// Prelude module for convenient imports.
pub mod prelude;

/// Wall-clock abstraction.
pub mod clock;
/// Monitor configuration.
pub mod config;
/// Error types.
pub mod error;
/// Display tickers.
pub mod scheduler;
/// Session composition root.
pub mod session;
/// Price and baseline collaborators.
pub mod sources;
/// Snapshot storage.
pub mod sync;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::MonitorError;
