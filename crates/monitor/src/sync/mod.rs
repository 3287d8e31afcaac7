//! Chain-poll side: snapshot storage and delivery.

mod snapshot_store;

pub use snapshot_store::*;
