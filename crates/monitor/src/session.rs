//! Composition root for a live monitoring session.
//!
//! An [`EarnSession`] wires the aggregator, the snapshot store and one
//! display ticker per observed contract. The chain poller pushes snapshots
//! through publishers; consumers read ticks from the receiver and full view
//! models from [`EarnSession::positions`].

use crate::clock::Clock;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::scheduler::{RewardsTick, RewardsTicker, TickerHandle};
use crate::sources::{BaselineResolver, PriceSource};
use crate::sync::{SnapshotPublisher, SnapshotStore};
use earn_aggregator::{EarnDataAggregator, EarnPosition, SessionData};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

pub struct EarnSession {
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    aggregator: Arc<EarnDataAggregator>,
    store: SnapshotStore,
    tickers: RwLock<HashMap<String, TickerHandle>>,
    tick_tx: mpsc::Sender<RewardsTick>,
    tick_rx: Option<mpsc::Receiver<RewardsTick>>,
}

impl EarnSession {
    pub fn new(session: SessionData, clock: Arc<dyn Clock>, config: MonitorConfig) -> Self {
        let (tick_tx, tick_rx) = mpsc::channel(config.channel_capacity.max(1));
        Self {
            config,
            clock,
            aggregator: Arc::new(EarnDataAggregator::new(session)),
            store: SnapshotStore::new(),
            tickers: RwLock::new(HashMap::new()),
            tick_tx,
            tick_rx: Some(tick_rx),
        }
    }

    /// Completes session data from the collaborators: prices for every
    /// token the session cannot price yet, and baselines for contracts
    /// that lack one. Failures are logged; the affected fields stay empty.
    pub async fn prepare(
        mut session: SessionData,
        prices: &dyn PriceSource,
        baselines: &dyn BaselineResolver,
        now: u64,
    ) -> SessionData {
        let unpriced = session.unpriced_tokens();
        if !unpriced.is_empty() {
            match prices.prices(&unpriced).await {
                Ok(fetched) => {
                    info!(
                        requested = unpriced.len(),
                        fetched = fetched.len(),
                        "Fetched token prices"
                    );
                    session = session.with_raw_prices(&fetched);
                }
                Err(e) => warn!(error = %e, "Price source failed"),
            }
        }

        let contracts = session.contracts().to_vec();
        for contract in contracts {
            if session.baseline(&contract.address).is_some() {
                continue;
            }
            match baselines.resolve(&contract, now).await {
                Ok(baseline) => session.set_baseline(&contract.address, baseline),
                Err(e) => warn!(contract = %contract.address, error = %e, "No APY baseline"),
            }
        }
        session
    }

    /// Takes the tick receiver. Returns `None` after the first call.
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<RewardsTick>> {
        self.tick_rx.take()
    }

    pub fn aggregator(&self) -> &Arc<EarnDataAggregator> {
        &self.aggregator
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    fn known_contract(&self, contract: &str) -> Result<(), MonitorError> {
        self.aggregator
            .session()
            .contract(contract)
            .map(|_| ())
            .ok_or_else(|| MonitorError::UnknownContract(contract.to_string()))
    }

    /// Write handle for the chain poller.
    pub async fn publisher(&self, contract: &str) -> Result<SnapshotPublisher, MonitorError> {
        self.known_contract(contract)?;
        Ok(self.store.publisher(contract).await)
    }

    /// Starts a display ticker for `contract`. Observing an already
    /// observed contract is a no-op.
    pub async fn observe(&self, contract: &str) -> Result<(), MonitorError> {
        let meta = self
            .aggregator
            .session()
            .contract(contract)
            .cloned()
            .ok_or_else(|| MonitorError::UnknownContract(contract.to_string()))?;
        let key = contract.to_lowercase();

        let mut tickers = self.tickers.write().await;
        if tickers.get(&key).is_some_and(TickerHandle::is_running) {
            return Ok(());
        }
        let ticker = RewardsTicker::new(
            meta,
            Arc::clone(&self.aggregator),
            self.store.subscribe(&key).await,
            Arc::clone(&self.clock),
            self.config.clone(),
        );
        tickers.insert(key.clone(), ticker.spawn(self.tick_tx.clone()));
        info!(contract = %key, "Observing contract");
        Ok(())
    }

    /// Stops the ticker for `contract`. Returns whether one was running.
    pub async fn unobserve(&self, contract: &str) -> bool {
        let removed = self.tickers.write().await.remove(&contract.to_lowercase());
        match removed {
            Some(handle) => {
                handle.stop();
                info!(contract = %contract, "Stopped observing contract");
                true
            }
            None => false,
        }
    }

    pub async fn observed(&self) -> Vec<String> {
        let mut observed: Vec<String> = self.tickers.read().await.keys().cloned().collect();
        observed.sort();
        observed
    }

    /// Full view models at the clock's current time.
    pub async fn positions(&self) -> Vec<EarnPosition> {
        let snapshots = self.store.snapshot_map().await;
        self.aggregator.aggregate(&snapshots, self.clock.now())
    }

    /// Stops every ticker.
    pub async fn shutdown(&self) {
        let handles: Vec<TickerHandle> = self.tickers.write().await.drain().map(|(_, h)| h).collect();
        info!(tickers = handles.len(), "Shutting down session");
        for handle in &handles {
            handle.stop();
        }
    }
}
