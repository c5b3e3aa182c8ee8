//! Reconnect delay policy.

use std::time::Duration;

use socialhub_core::config::RealtimeConfig;

/// Exponential reconnect backoff: `min(max, base * 2^attempts)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry of an outage.
    pub base: Duration,
    /// Ceiling for any delay.
    pub max: Duration,
}

impl ReconnectPolicy {
    /// Create a policy from explicit bounds.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Create a policy from configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(config.reconnect_base(), config.reconnect_max())
    }

    /// Delay to wait after `attempts` failed reconnects in the current outage.
    pub fn delay(&self, attempts: u32) -> Duration {
        let factor = 2u32.checked_pow(attempts).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.max, |delay| delay.min(self.max))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), Duration::from_secs(30))
    }
}
