//! Durable key/value storage backends and the keys the session uses.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Storage key for the session token.
pub const TOKEN_KEY: &str = "socialhub.token";

/// Storage key for the manager account id.
pub const MANAGER_ID_KEY: &str = "socialhub.manager_id";

/// Storage key for the active profile id.
pub const ACTIVE_PROFILE_KEY: &str = "socialhub.active_profile_id";

/// Every key the session persists.
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, MANAGER_ID_KEY, ACTIVE_PROFILE_KEY];
