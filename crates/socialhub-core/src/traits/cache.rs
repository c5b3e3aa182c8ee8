//! Reactive query cache trait.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::result::AppResult;

/// A keyed cache of server-fetched data with invalidate/reset semantics.
///
/// Values are JSON documents. Implementations guarantee at most one fetch
/// in flight per key: concurrent callers of [`QueryCache::fetch`] for the
/// same key share one result.
#[async_trait]
pub trait QueryCache: Send + Sync + std::fmt::Debug + 'static {
    /// Get a cached value. Returns `None` if the key is absent or invalidated.
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Return the cached value for `key`, running `fetch` to fill it if absent.
    async fn fetch(
        &self,
        key: &str,
        fetch: BoxFuture<'static, AppResult<serde_json::Value>>,
    ) -> AppResult<serde_json::Value>;

    /// Mark a single query stale so its next read refetches.
    async fn invalidate(&self, key: &str);

    /// Drop every cached entry.
    async fn reset(&self);
}
