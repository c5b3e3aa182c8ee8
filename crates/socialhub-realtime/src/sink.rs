//! Tracing-backed notifier and activity log for headless clients.

use tracing::{error, info, warn};

use socialhub_core::traits::notifier::{ActivityLog, Notifier, Severity, Toast};

/// Writes toasts to the log instead of a screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show(&self, toast: Toast) {
        emit(toast.id.as_deref(), &toast);
    }

    fn update(&self, id: &str, toast: Toast) {
        emit(Some(id), &toast);
    }
}

fn emit(id: Option<&str>, toast: &Toast) {
    let id = id.unwrap_or("-");
    match toast.severity {
        Severity::Error => error!(toast = id, "{}", toast.message),
        Severity::Warning => warn!(toast = id, "{}", toast.message),
        Severity::Loading | Severity::Success => {
            info!(toast = id, severity = toast.severity.as_str(), "{}", toast.message)
        }
    }
}

/// Forwards server `log` events to tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivityLog;

impl ActivityLog for TracingActivityLog {
    fn record(&self, payload: &serde_json::Value) {
        let message = payload
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| payload.to_string());
        info!(target: "socialhub::activity", "{message}");
    }
}
