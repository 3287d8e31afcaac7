//! Latest chain snapshot per staking-rewards contract.
//!
//! The chain poller writes through a [`SnapshotPublisher`]; tickers and
//! aggregation read. Each contract has its own `watch` channel, so a
//! publish replaces the previous snapshot in one step and readers never
//! observe a partially written value.

use crate::error::MonitorError;
use earn_aggregator::SnapshotMap;
use earn_domain::entities::StakingRewardsSnapshot;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

type SnapshotSlot = Arc<watch::Sender<Option<StakingRewardsSnapshot>>>;

/// Write handle for one contract's snapshot slot.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    contract: String,
    slot: SnapshotSlot,
}

impl SnapshotPublisher {
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Replaces the stored snapshot. Last writer wins.
    pub fn publish(&self, snapshot: StakingRewardsSnapshot) -> Result<(), MonitorError> {
        if !snapshot.address.eq_ignore_ascii_case(&self.contract) {
            return Err(MonitorError::SnapshotMismatch {
                expected: self.contract.clone(),
                actual: snapshot.address,
            });
        }
        debug!(
            contract = %self.contract,
            last_update_time = snapshot.last_update_time,
            "Publishing snapshot"
        );
        self.slot.send_replace(Some(snapshot));
        Ok(())
    }
}

/// Registry of per-contract snapshot slots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    slots: Arc<RwLock<HashMap<String, SnapshotSlot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, contract: &str) -> SnapshotSlot {
        let key = contract.to_lowercase();
        if let Some(slot) = self.slots.read().await.get(&key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(key).or_insert_with(|| {
            info!(contract = %contract, "Created snapshot slot");
            Arc::new(watch::channel(None).0)
        }))
    }

    pub async fn publisher(&self, contract: &str) -> SnapshotPublisher {
        SnapshotPublisher {
            contract: contract.to_lowercase(),
            slot: self.slot(contract).await,
        }
    }

    /// Receiver that always sees the latest snapshot, `None` until the
    /// first publish.
    pub async fn subscribe(&self, contract: &str) -> watch::Receiver<Option<StakingRewardsSnapshot>> {
        self.slot(contract).await.subscribe()
    }

    pub async fn latest(&self, contract: &str) -> Option<StakingRewardsSnapshot> {
        let slots = self.slots.read().await;
        slots
            .get(&contract.to_lowercase())
            .and_then(|slot| slot.borrow().clone())
    }

    /// Every published snapshot, keyed by contract address.
    pub async fn snapshot_map(&self) -> SnapshotMap {
        let slots = self.slots.read().await;
        slots
            .iter()
            .filter_map(|(address, slot)| {
                slot.borrow()
                    .clone()
                    .map(|snapshot| (address.clone(), snapshot))
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}
