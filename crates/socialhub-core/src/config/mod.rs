//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a default so an empty configuration loads.

pub mod api;
pub mod cache;
pub mod logging;
pub mod realtime;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::api::ApiConfig;
pub use self::cache::QueryCacheConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::realtime::RealtimeConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Real-time event stream settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// HTTP API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Query cache settings.
    #[serde(default)]
    pub cache: QueryCacheConfig,
    /// Durable session storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the `config/` directory.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SOCIALHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from_dir("config", env)
    }

    /// Load configuration from `dir/default.toml` and `dir/{env}.toml`.
    pub fn load_from_dir(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SOCIALHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let config = AppConfig::load_from_dir("does-not-exist", "test").unwrap();
        assert_eq!(config.realtime.reconnect_base_ms, 3_000);
        assert_eq!(config.realtime.reconnect_max_ms, 30_000);
        assert_eq!(config.storage.path, "data/session.json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_source_overrides_single_field() {
        let parsed: AppConfig = from_json(
            r#"{"realtime": {"url": "wss://events.example.com/ws"}}"#,
        );
        assert_eq!(parsed.realtime.url, "wss://events.example.com/ws");
        assert_eq!(parsed.realtime.reconnect_base_ms, 3_000);
        assert_eq!(parsed.api.timeout_seconds, 15);
    }

    fn from_json(json: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(json, config::FileFormat::Json))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
