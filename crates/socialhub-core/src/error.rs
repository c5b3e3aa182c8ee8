//! Error type shared by every SocialHub crate.
//!
//! Library code returns [`AppResult`](crate::result::AppResult). Foreign
//! errors convert through the `From` impls below so `?` works everywhere.

use std::fmt;

use thiserror::Error;

/// Failure category. Callers branch on this, never on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The server has no such resource.
    NotFound,
    /// The token is missing, invalid or expired.
    Authentication,
    /// Caller input was rejected before any I/O.
    Validation,
    /// A bug or an unexpected state.
    Internal,
    /// Durable local storage could not be read or written.
    Storage,
    /// Configuration is missing or malformed.
    Configuration,
    /// JSON could not be encoded or decoded.
    Serialization,
    /// The event-stream socket failed.
    Connection,
    /// The HTTP API answered with an error.
    ExternalService,
    /// The HTTP API is down or overloaded.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Stable lowercase name, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Storage => "storage",
            Self::Configuration => "configuration",
            Self::Serialization => "serialization",
            Self::Connection => "connection",
            Self::ExternalService => "external_service",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized error with an optional cause.
#[derive(Debug, Error)]
#[error("{message} ({kind})")]
pub struct AppError {
    pub kind: ErrorKind,
    /// Message fit for a toast.
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Generates one shorthand constructor per error kind.
macro_rules! kind_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("Shorthand for an [`ErrorKind::", stringify!($kind), "`] error.")]
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorKind::$kind, message)
            }
        )*
    };
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap `source` under `kind`.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    kind_constructors! {
        not_found => NotFound,
        authentication => Authentication,
        validation => Validation,
        internal => Internal,
        storage => Storage,
        configuration => Configuration,
        connection => Connection,
        external_service => ExternalService,
        service_unavailable => ServiceUnavailable,
    }

    /// Whether the server rejected the current credential.
    pub fn is_authentication(&self) -> bool {
        self.kind == ErrorKind::Authentication
    }
}

/// Cloning keeps the kind and message and drops the source.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("Invalid JSON: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("Storage I/O failed: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(ErrorKind::Configuration, err.to_string(), err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let kind = match err.status() {
            Some(reqwest::StatusCode::UNAUTHORIZED) => ErrorKind::Authentication,
            Some(reqwest::StatusCode::NOT_FOUND) => ErrorKind::NotFound,
            Some(status) if status.is_server_error() => ErrorKind::ServiceUnavailable,
            None if err.is_connect() || err.is_timeout() => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::ExternalService,
        };
        Self::with_source(kind, format!("HTTP request failed: {err}"), err)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::with_source(ErrorKind::Connection, format!("WebSocket error: {err}"), err)
    }
}
