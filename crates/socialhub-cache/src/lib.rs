//! # socialhub-cache
//!
//! Reactive query cache for the SocialHub client, backed by
//! [moka](https://crates.io/crates/moka). Session and real-time events
//! invalidate single queries or reset the whole cache; observers can follow
//! those changes through [`MemoryQueryCache::subscribe`].

pub mod keys;
pub mod store;

pub use store::{CacheEvent, MemoryQueryCache};
