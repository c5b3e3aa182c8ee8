//! Real-time event stream configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Event stream endpoint. The session token is appended as the
    /// `token` query parameter.
    #[serde(default = "default_url")]
    pub url: String,
    /// Delay before the first reconnect attempt after an outage, in milliseconds.
    #[serde(default = "default_reconnect_base")]
    pub reconnect_base_ms: u64,
    /// Upper bound for the reconnect delay, in milliseconds.
    #[serde(default = "default_reconnect_max")]
    pub reconnect_max_ms: u64,
}

impl RealtimeConfig {
    /// Base reconnect interval as a [`Duration`].
    pub fn reconnect_base(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_ms)
    }

    /// Maximum reconnect interval as a [`Duration`].
    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_base_ms: default_reconnect_base(),
            reconnect_max_ms: default_reconnect_max(),
        }
    }
}

fn default_url() -> String {
    "ws://localhost:8000/ws".to_string()
}

fn default_reconnect_base() -> u64 {
    3_000
}

fn default_reconnect_max() -> u64 {
    30_000
}
