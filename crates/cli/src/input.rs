//! JSON input files.

use anyhow::{Context, Result};
use earn_aggregator::SessionInput;
use earn_domain::entities::StakingRewardsSnapshot;
use serde_json::from_str;
use std::fs;
use std::path::Path;

/// Reads the session file: raw pools, prices, contracts and baselines.
pub fn load_session(path: &Path) -> Result<SessionInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading session file {}", path.display()))?;
    from_str(&raw).with_context(|| format!("parsing session file {}", path.display()))
}

/// Reads the snapshots file, a JSON array with one snapshot per contract.
pub fn load_snapshots(path: &Path) -> Result<Vec<StakingRewardsSnapshot>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading snapshots file {}", path.display()))?;
    from_str(&raw).with_context(|| format!("parsing snapshots file {}", path.display()))
}
