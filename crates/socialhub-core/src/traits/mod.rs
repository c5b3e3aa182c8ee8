//! Core traits defined in `socialhub-core` and implemented by other crates.

pub mod api;
pub mod cache;
pub mod notifier;
pub mod storage;

pub use api::{ProfileSwitcher, UserInfoFetcher};
pub use cache::QueryCache;
pub use notifier::{ActivityLog, Notifier, Severity, Toast};
pub use storage::KeyValueStore;
