//! Server event definitions and frame decoding.
//!
//! Frames are JSON envelopes `{"type": "...", "payload": {...}}`. The `type`
//! tag is matched against the known event kinds; anything else decodes to
//! [`ServerEvent::Unknown`] so new server events never break old clients.
//!
//! Payloads are decoded leniently. A field of the wrong type reads as absent
//! and a payload that is not an object reads as empty, so a known event kind
//! is still dispatched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use socialhub_core::error::AppError;
use socialhub_core::traits::notifier::Severity;

/// Maximum accepted frame size in bytes.
const MAX_FRAME_SIZE: usize = 1_048_576;

/// Raw wire envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Diagnostic output from a running automation.
    Log(serde_json::Value),
    /// Usage counters changed.
    StatsUpdate,
    /// A task run was recorded or changed state.
    TaskHistoryUpdate(TaskHistoryUpdate),
    /// A new in-app notification exists.
    NewNotification(NewNotification),
    /// An event kind this client does not know.
    Unknown {
        /// The unrecognized `type` tag.
        kind: String,
    },
}

impl ServerEvent {
    /// The wire tag of this event.
    pub fn kind(&self) -> &str {
        match self {
            Self::Log(_) => "log",
            Self::StatsUpdate => "stats_update",
            Self::TaskHistoryUpdate(_) => "task_history_update",
            Self::NewNotification(_) => "new_notification",
            Self::Unknown { kind } => kind,
        }
    }
}

/// Payload of `task_history_update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHistoryUpdate {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_name: Option<String>,
}

/// Final outcome of a task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed,
}

impl TaskHistoryUpdate {
    /// Outcome, if the status is terminal. Matching is case-insensitive.
    pub fn outcome(&self) -> Option<TaskOutcome> {
        match self.status.as_deref()?.trim().to_lowercase().as_str() {
            "success" => Some(TaskOutcome::Succeeded),
            "failure" => Some(TaskOutcome::Failed),
            _ => None,
        }
    }
}

/// Payload of `new_notification`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    #[serde(default, deserialize_with = "lenient_string")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

impl NewNotification {
    /// Toast severity: `error` is an error, `warning` is error-styled,
    /// everything else reads as success.
    pub fn severity(&self) -> Severity {
        match self.level.as_deref().map(str::to_lowercase).as_deref() {
            Some("error") => Severity::Error,
            Some("warning") => Severity::Warning,
            _ => Severity::Success,
        }
    }

    /// Text to show.
    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("You have a new notification")
    }
}

/// Keep a field only if it holds a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn decode_payload<T: DeserializeOwned + Default>(kind: &str, payload: serde_json::Value) -> T {
    serde_json::from_value(payload).unwrap_or_else(|e| {
        warn!(kind, error = %e, "Ignoring malformed event payload");
        T::default()
    })
}

/// Decode one text frame.
///
/// Fails only when the envelope itself is unusable.
pub fn decode(raw: &str) -> Result<ServerEvent, AppError> {
    if raw.len() > MAX_FRAME_SIZE {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {} bytes",
            MAX_FRAME_SIZE
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    let envelope: Envelope = serde_json::from_str(raw)?;
    let payload = match envelope.payload {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        other => other,
    };

    let event = match envelope.kind.as_str() {
        "log" => ServerEvent::Log(payload),
        "stats_update" => ServerEvent::StatsUpdate,
        "task_history_update" => {
            ServerEvent::TaskHistoryUpdate(decode_payload(&envelope.kind, payload))
        }
        "new_notification" => {
            ServerEvent::NewNotification(decode_payload(&envelope.kind, payload))
        }
        _ => ServerEvent::Unknown {
            kind: envelope.kind,
        },
    };

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_task_history() {
        let event = decode(
            r#"{"type": "task_history_update", "payload": {"status": "SUCCESS", "task_name": "X"}}"#,
        )
        .unwrap();
        let ServerEvent::TaskHistoryUpdate(update) = event else {
            panic!("expected task history update");
        };
        assert_eq!(update.task_name.as_deref(), Some("X"));
        assert_eq!(update.outcome(), Some(TaskOutcome::Succeeded));
    }

    #[test]
    fn test_running_status_has_no_outcome() {
        let update = TaskHistoryUpdate {
            status: Some("RUNNING".to_string()),
            task_name: Some("X".to_string()),
        };
        assert_eq!(update.outcome(), None);
    }

    #[test]
    fn test_decode_without_payload() {
        assert_eq!(decode(r#"{"type": "stats_update"}"#).unwrap(), ServerEvent::StatsUpdate);
        assert!(matches!(
            decode(r#"{"type": "task_history_update"}"#).unwrap(),
            ServerEvent::TaskHistoryUpdate(_)
        ));
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let event = decode(r#"{"type": "profile_banned", "payload": {}}"#).unwrap();
        assert_eq!(
            event,
            ServerEvent::Unknown {
                kind: "profile_banned".to_string()
            }
        );
        assert_eq!(event.kind(), "profile_banned");
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(decode("not json").is_err());
        assert!(decode("   ").is_err());
        assert!(decode(r#"{"payload": {}}"#).is_err());
    }

    #[test]
    fn test_bad_payload_fields_read_as_absent() {
        let event = decode(
            r#"{"type": "task_history_update", "payload": {"status": "SUCCESS", "task_name": 12}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ServerEvent::TaskHistoryUpdate(TaskHistoryUpdate {
                status: Some("SUCCESS".to_string()),
                task_name: None,
            })
        );

        let event = decode(
            r#"{"type": "new_notification", "payload": {"level": "error", "message": {"text": "hi"}}}"#,
        )
        .unwrap();
        let ServerEvent::NewNotification(notification) = event else {
            panic!("expected new notification");
        };
        assert_eq!(notification.message, None);
        assert_eq!(notification.severity(), Severity::Error);
        assert_eq!(notification.text(), "You have a new notification");
    }

    #[test]
    fn test_non_object_payload_reads_as_empty() {
        assert_eq!(
            decode(r#"{"type": "new_notification", "payload": "oops"}"#).unwrap(),
            ServerEvent::NewNotification(NewNotification::default())
        );
        assert_eq!(
            decode(r#"{"type": "task_history_update", "payload": [1, 2]}"#).unwrap(),
            ServerEvent::TaskHistoryUpdate(TaskHistoryUpdate::default())
        );
    }

    #[test]
    fn test_notification_severity_mapping() {
        let with_level = |level: &str| NewNotification {
            level: Some(level.to_string()),
            ..Default::default()
        };
        assert_eq!(with_level("error").severity(), Severity::Error);
        assert_eq!(with_level("WARNING").severity(), Severity::Warning);
        assert_eq!(with_level("info").severity(), Severity::Success);
        assert_eq!(NewNotification::default().severity(), Severity::Success);
    }
}
