//! Query cache configuration.

use serde::{Deserialize, Serialize};

/// Bounds of the in-memory query cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCacheConfig {
    /// Most queries held at once; the least recently used are evicted.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Seconds before a fetched value expires even without an invalidation.
    #[serde(default = "default_ttl")]
    pub time_to_live_seconds: u64,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            time_to_live_seconds: default_ttl(),
        }
    }
}

fn default_max_capacity() -> u64 {
    1_000
}

/// Five minutes.
fn default_ttl() -> u64 {
    300
}
