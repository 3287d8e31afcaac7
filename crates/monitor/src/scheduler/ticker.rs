//! Display ticker: re-derives claimable rewards on a fixed interval.
//!
//! The ticker reads whatever snapshot the poller stored last and the
//! current wall-clock time. It does no I/O and never waits on the poller;
//! a tick the consumer has no room for is dropped.

use crate::clock::Clock;
use crate::config::MonitorConfig;
use earn_aggregator::{EarnDataAggregator, LiveRewards};
use earn_domain::entities::{StakingRewardsContract, StakingRewardsSnapshot};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// Claimable rewards for one contract at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardsTick {
    pub contract: String,
    /// Unix seconds the estimate was computed for.
    pub now: u64,
    pub rewards: LiveRewards,
}

/// Periodic reward estimator for one contract.
pub struct RewardsTicker {
    contract: StakingRewardsContract,
    aggregator: Arc<EarnDataAggregator>,
    snapshots: watch::Receiver<Option<StakingRewardsSnapshot>>,
    clock: Arc<dyn Clock>,
    config: MonitorConfig,
}

impl RewardsTicker {
    pub fn new(
        contract: StakingRewardsContract,
        aggregator: Arc<EarnDataAggregator>,
        snapshots: watch::Receiver<Option<StakingRewardsSnapshot>>,
        clock: Arc<dyn Clock>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            contract,
            aggregator,
            snapshots,
            clock,
            config,
        }
    }

    /// Computes one tick from the latest snapshot.
    pub fn tick(&self) -> RewardsTick {
        let now = self.clock.now();
        let snapshot = self.snapshots.borrow().clone();
        RewardsTick {
            contract: self.contract.address.clone(),
            now,
            rewards: self
                .aggregator
                .live_rewards(&self.contract, snapshot.as_ref(), now),
        }
    }

    /// Runs the ticker on the current runtime until the handle is stopped
    /// or dropped, or the receiver goes away.
    pub fn spawn(self, tick_tx: mpsc::Sender<RewardsTick>) -> TickerHandle {
        let running = Arc::new(AtomicBool::new(true));
        let contract = self.contract.address.clone();
        let task = tokio::spawn(self.run(tick_tx, Arc::clone(&running)));
        TickerHandle {
            contract,
            running,
            task,
        }
    }

    async fn run(self, tick_tx: mpsc::Sender<RewardsTick>, running: Arc<AtomicBool>) {
        info!(
            contract = %self.contract.address,
            interval_ms = self.config.tick_interval.as_millis() as u64,
            "Starting rewards ticker"
        );

        let mut ticks = interval(self.config.tick_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while running.load(Ordering::SeqCst) {
            ticks.tick().await;

            let tick = self.tick();
            debug!(
                contract = %tick.contract,
                now = tick.now,
                state = ?tick.rewards.state,
                "Rewards tick"
            );

            match tick_tx.try_send(tick) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!(contract = %self.contract.address, "Tick channel full, dropping tick");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    info!(contract = %self.contract.address, "Tick receiver dropped");
                    break;
                }
            }
        }

        info!(contract = %self.contract.address, "Rewards ticker stopped");
    }
}

/// Owns a running ticker task. Stopping or dropping the handle ends the
/// task.
#[derive(Debug)]
pub struct TickerHandle {
    contract: String,
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.task.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
