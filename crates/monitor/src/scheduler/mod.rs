//! Display-tick side: timers that re-derive rewards between polls.

mod ticker;

pub use ticker::*;
