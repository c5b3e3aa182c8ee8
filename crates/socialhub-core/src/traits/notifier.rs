//! Transient user-facing notifications and the server activity log.

use serde::{Deserialize, Serialize};

/// Visual severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// An operation is in progress.
    Loading,
    /// Something completed.
    Success,
    /// Needs attention but nothing failed. Rendered with error styling.
    Warning,
    /// Something failed.
    Error,
}

impl Severity {
    /// Converts to string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Whether the toast should be rendered with error styling.
    pub fn is_error_styled(&self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Optional identity, so a later toast can replace this one.
    pub id: Option<String>,
    /// Severity.
    pub severity: Severity,
    /// Text shown to the user.
    pub message: String,
}

impl Toast {
    /// Build an anonymous toast.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: None,
            severity,
            message: message.into(),
        }
    }

    /// Attach an identity.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self::new(Severity::Loading, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

/// Display surface for transient notifications.
pub trait Notifier: Send + Sync + std::fmt::Debug + 'static {
    /// Show a toast.
    fn show(&self, toast: Toast);

    /// Replace the toast previously shown with identity `id`.
    fn update(&self, id: &str, toast: Toast);
}

/// Sink for diagnostic `log` events streamed by the server.
pub trait ActivityLog: Send + Sync + std::fmt::Debug + 'static {
    /// Record one log payload.
    fn record(&self, payload: &serde_json::Value);
}
