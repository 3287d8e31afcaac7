//! Monitor configuration.

use std::env;
use std::time::Duration;
use tracing::warn;

/// Environment variable overriding [`MonitorConfig::tick_interval`], in
/// milliseconds.
pub const TICK_INTERVAL_ENV: &str = "EARN_TICK_INTERVAL_MS";

/// Configuration for the display ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// How often claimable rewards are re-derived.
    pub tick_interval: Duration,
    /// Capacity of the tick channel. Ticks are dropped while it is full.
    pub channel_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            channel_capacity: 64,
        }
    }
}

impl MonitorConfig {
    /// Defaults with [`TICK_INTERVAL_ENV`] applied when set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match env::var(TICK_INTERVAL_ENV) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.with_tick_interval(Duration::from_millis(ms)),
                _ => {
                    warn!(value = %raw, "Ignoring invalid {}", TICK_INTERVAL_ENV);
                    config
                }
            },
            Err(_) => config,
        }
    }

    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    #[must_use]
    pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.channel_capacity, 64);
    }

    #[test]
    fn test_builders() {
        let config = MonitorConfig::default()
            .with_tick_interval(Duration::from_millis(250))
            .with_channel_capacity(0);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.channel_capacity, 1);
    }
}
