//! Command Line Interface for the earn analytics engine.
mod input;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use earn_aggregator::{EarnDataAggregator, SessionData, index_snapshots};
use earn_domain::metrics::{ApyMetric, annualize};
use earn_monitor::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "earn")]
#[command(about = "Reward accrual and yield analytics for staking positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one row per staking-rewards contract
    Report {
        /// Session file (pools, prices, contracts, baselines)
        #[arg(short, long)]
        session: PathBuf,

        /// Snapshots file; contracts without a snapshot show as loading
        #[arg(long)]
        snapshots: Option<PathBuf>,

        /// Unix seconds to evaluate at (defaults to now)
        #[arg(long)]
        at: Option<u64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Stream live reward estimates between polls
    Watch {
        /// Session file (pools, prices, contracts, baselines)
        #[arg(short, long)]
        session: PathBuf,

        /// Snapshots file
        #[arg(long)]
        snapshots: PathBuf,

        /// Contracts to observe (all when omitted)
        #[arg(short, long)]
        contract: Vec<String>,

        /// Stop after this many ticks (0 runs until interrupted)
        #[arg(short = 'n', long, default_value_t = 10)]
        ticks: usize,

        /// Tick interval in milliseconds (overrides EARN_TICK_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Start the clock at this unix time instead of now
        #[arg(long)]
        replay_from: Option<u64>,
    },
    /// Annualize an increase observed since a window start
    Apy {
        /// Increase over the window, as a fraction of the base value
        #[arg(long)]
        increase: Decimal,

        /// Unix seconds the window started
        #[arg(long)]
        window_start: u64,

        /// Unix seconds the window ended (defaults to now)
        #[arg(long)]
        at: Option<u64>,
    },
}

/// A clock that starts at a fixed time and then runs in real time.
struct ReplayClock {
    start: u64,
    origin: Instant,
}

impl ReplayClock {
    fn new(start: u64) -> Self {
        Self {
            start,
            origin: Instant::now(),
        }
    }
}

impl Clock for ReplayClock {
    fn now(&self) -> u64 {
        self.start + self.origin.elapsed().as_secs()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    logging::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            session,
            snapshots,
            at,
            json,
        } => {
            let session = SessionData::from_input(input::load_session(&session)?);
            let snapshots = match snapshots {
                Some(path) => input::load_snapshots(&path)?,
                None => Vec::new(),
            };
            let now = at.unwrap_or_else(|| SystemClock.now());

            let aggregator = EarnDataAggregator::new(session);
            let positions = aggregator.aggregate(&index_snapshots(snapshots), now);

            if json {
                println!("{}", serde_json::to_string_pretty(&positions)?);
            } else {
                output::positions_table(&positions).printstd();
            }
        }
        Commands::Watch {
            session,
            snapshots,
            contract,
            ticks,
            interval_ms,
            replay_from,
        } => {
            let mut config = MonitorConfig::from_env();
            if let Some(ms) = interval_ms {
                config = config.with_tick_interval(Duration::from_millis(ms.max(1)));
            }
            let clock: Arc<dyn Clock> = match replay_from {
                Some(start) => Arc::new(ReplayClock::new(start)),
                None => Arc::new(SystemClock),
            };

            let data = SessionData::from_input(input::load_session(&session)?);
            let mut session = EarnSession::new(data, clock, config);
            let mut tick_rx = session
                .take_receiver()
                .context("tick receiver already taken")?;

            for snapshot in input::load_snapshots(&snapshots)? {
                match session.publisher(&snapshot.address).await {
                    Ok(publisher) => publisher.publish(snapshot)?,
                    Err(e) => warn!(error = %e, "Skipping snapshot"),
                }
            }

            let titles: HashMap<String, String> = session
                .aggregator()
                .session()
                .contracts()
                .iter()
                .map(|c| (c.address.to_lowercase(), c.title.clone()))
                .collect();
            let targets = if contract.is_empty() {
                titles.keys().cloned().collect()
            } else {
                contract
            };
            for address in &targets {
                session.observe(address).await?;
            }
            info!(contracts = targets.len(), "Watching");

            let mut received = 0usize;
            loop {
                tokio::select! {
                    tick = tick_rx.recv() => {
                        let Some(tick) = tick else { break };
                        let title = titles
                            .get(&tick.contract.to_lowercase())
                            .map_or(tick.contract.as_str(), String::as_str);
                        println!("{}", output::tick_line(&tick, title));
                        received += 1;
                        if ticks > 0 && received >= ticks {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupted");
                        break;
                    }
                }
            }

            session.shutdown().await;
            println!();
            output::positions_table(&session.positions().await).printstd();
        }
        Commands::Apy {
            increase,
            window_start,
            at,
        } => {
            let now = at.unwrap_or_else(|| SystemClock.now());
            let value = annualize(increase, window_start, now)
                .context("cannot annualize over the given window")?;
            println!(
                "APY over {}s: {}",
                now - window_start,
                output::apy(&ApyMetric::Measured { value })
            );
        }
    }

    Ok(())
}
