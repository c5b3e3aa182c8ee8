//! In-memory query cache implementation using the moka crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use moka::future::Cache;
use tokio::sync::broadcast;
use tracing::debug;

use socialhub_core::config::QueryCacheConfig;
use socialhub_core::error::AppError;
use socialhub_core::result::AppResult;
use socialhub_core::traits::cache::QueryCache;

/// Capacity of the change-notification channel.
const EVENT_BUFFER: usize = 64;

/// A change observed on the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// One query was marked stale.
    Invalidated(String),
    /// Every query was dropped.
    Reset,
}

/// In-memory query cache using moka.
///
/// Entries are stored under a generation prefix. [`QueryCache::reset`] bumps
/// the generation, so a fetch that was in flight when the reset happened
/// lands in the old generation and is never read back.
#[derive(Debug, Clone)]
pub struct MemoryQueryCache {
    /// The underlying moka cache.
    cache: Cache<String, serde_json::Value>,
    /// Current generation, bumped on every reset.
    generation: Arc<AtomicU64>,
    /// Change notifications for observers.
    events: broadcast::Sender<CacheEvent>,
}

impl MemoryQueryCache {
    /// Create a new query cache from configuration.
    pub fn new(config: &QueryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.time_to_live_seconds))
            .build();
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    /// Follow invalidations and resets.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Number of resets performed so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}:{key}", self.generation())
    }

    fn publish(&self, event: CacheEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl QueryCache for MemoryQueryCache {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.cache.get(&self.scoped(key)).await
    }

    async fn fetch(
        &self,
        key: &str,
        fetch: BoxFuture<'static, AppResult<serde_json::Value>>,
    ) -> AppResult<serde_json::Value> {
        self.cache
            .try_get_with(self.scoped(key), fetch)
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }

    async fn invalidate(&self, key: &str) {
        self.cache.invalidate(&self.scoped(key)).await;
        debug!(key, "Query invalidated");
        self.publish(CacheEvent::Invalidated(key.to_string()));
    }

    async fn reset(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cache.invalidate_all();
        debug!(generation, "Query cache reset");
        self.publish(CacheEvent::Reset);
    }
}
