//! Query keys for every cached server resource.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every query the application invalidates.

/// Account limits and usage counters.
pub const LIMITS: &str = "limits";

/// History of automation task runs.
pub const TASK_HISTORY: &str = "task_history";

/// In-app notifications.
pub const NOTIFICATIONS: &str = "notifications";

/// The current user snapshot.
pub const CURRENT_USER: &str = "current_user";

/// Key for a chart widget's data series.
pub fn chart(name: &str) -> String {
    format!("chart:{}", name.to_lowercase())
}
