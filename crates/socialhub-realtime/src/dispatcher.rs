//! Event dispatcher: routes server events to the query cache and toasts.

use std::sync::Arc;

use tracing::{debug, warn};

use socialhub_cache::keys;
use socialhub_core::traits::cache::QueryCache;
use socialhub_core::traits::notifier::{ActivityLog, Notifier, Toast};

use crate::event::{self, ServerEvent, TaskOutcome};

/// Turns inbound frames into cache invalidations and user-facing toasts.
#[derive(Debug)]
pub struct EventDispatcher {
    /// Query cache to invalidate.
    cache: Arc<dyn QueryCache>,
    /// Toast surface.
    notifier: Arc<dyn Notifier>,
    /// Sink for server `log` events.
    activity: Arc<dyn ActivityLog>,
}

impl EventDispatcher {
    /// Create a new dispatcher
    pub fn new(
        cache: Arc<dyn QueryCache>,
        notifier: Arc<dyn Notifier>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            cache,
            notifier,
            activity,
        }
    }

    /// Decode and dispatch one text frame.
    ///
    /// Malformed frames are logged and dropped; this never fails.
    pub async fn handle_frame(&self, raw: &str) -> Option<ServerEvent> {
        match event::decode(raw) {
            Ok(event) => {
                self.dispatch(&event).await;
                Some(event)
            }
            Err(e) => {
                warn!(error = %e, len = raw.len(), "Discarding malformed event frame");
                None
            }
        }
    }

    /// Apply the effects of one decoded event.
    pub async fn dispatch(&self, event: &ServerEvent) {
        debug!(kind = event.kind(), "Dispatching server event");

        match event {
            ServerEvent::Log(payload) => self.activity.record(payload),
            ServerEvent::StatsUpdate => self.cache.invalidate(keys::LIMITS).await,
            ServerEvent::TaskHistoryUpdate(update) => {
                self.cache.invalidate(keys::TASK_HISTORY).await;
                if let (Some(outcome), Some(name)) = (update.outcome(), update.task_name.as_deref())
                {
                    let toast = match outcome {
                        TaskOutcome::Succeeded => {
                            Toast::success(format!("Task \"{name}\" completed successfully"))
                        }
                        TaskOutcome::Failed => Toast::error(format!("Task \"{name}\" failed")),
                    };
                    self.notifier.show(toast);
                }
            }
            ServerEvent::NewNotification(notification) => {
                self.cache.invalidate(keys::NOTIFICATIONS).await;
                self.notifier.show(Toast::new(
                    notification.severity(),
                    notification.text(),
                ));
            }
            ServerEvent::Unknown { kind } => {
                debug!(kind = %kind, "Ignoring unknown server event");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::future::BoxFuture;

    use socialhub_core::result::AppResult;
    use socialhub_core::traits::notifier::Severity;

    /// Query cache that only records what happened to it.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingCache {
        pub invalidated: Mutex<Vec<String>>,
        pub resets: Mutex<usize>,
    }

    #[async_trait]
    impl QueryCache for RecordingCache {
        async fn get(&self, _key: &str) -> Option<serde_json::Value> {
            None
        }

        async fn fetch(
            &self,
            _key: &str,
            fetch: BoxFuture<'static, AppResult<serde_json::Value>>,
        ) -> AppResult<serde_json::Value> {
            fetch.await
        }

        async fn invalidate(&self, key: &str) {
            self.invalidated.lock().unwrap().push(key.to_string());
        }

        async fn reset(&self) {
            *self.resets.lock().unwrap() += 1;
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingNotifier {
        pub toasts: Mutex<Vec<Toast>>,
    }

    impl Notifier for RecordingNotifier {
        fn show(&self, toast: Toast) {
            self.toasts.lock().unwrap().push(toast);
        }

        fn update(&self, id: &str, toast: Toast) {
            self.toasts.lock().unwrap().push(toast.with_id(id));
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingLog {
        pub entries: Mutex<Vec<serde_json::Value>>,
    }

    impl ActivityLog for RecordingLog {
        fn record(&self, payload: &serde_json::Value) {
            self.entries.lock().unwrap().push(payload.clone());
        }
    }

    struct Harness {
        cache: Arc<RecordingCache>,
        notifier: Arc<RecordingNotifier>,
        log: Arc<RecordingLog>,
        dispatcher: EventDispatcher,
    }

    fn harness() -> Harness {
        let cache = Arc::new(RecordingCache::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let log = Arc::new(RecordingLog::default());
        let dispatcher = EventDispatcher::new(cache.clone(), notifier.clone(), log.clone());
        Harness {
            cache,
            notifier,
            log,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn test_task_success_invalidates_and_toasts_once() {
        let h = harness();
        h.dispatcher
            .handle_frame(
                r#"{"type": "task_history_update", "payload": {"status": "SUCCESS", "task_name": "X"}}"#,
            )
            .await;

        assert_eq!(*h.cache.invalidated.lock().unwrap(), vec![keys::TASK_HISTORY]);
        let toasts = h.notifier.toasts.lock().unwrap();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, Severity::Success);
        assert!(toasts[0].message.contains('X'));
    }

    #[tokio::test]
    async fn test_task_failure_toasts_error() {
        let h = harness();
        h.dispatcher
            .handle_frame(
                r#"{"type": "task_history_update", "payload": {"status": "failure", "task_name": "Follow"}}"#,
            )
            .await;

        let toasts = h.notifier.toasts.lock().unwrap();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, Severity::Error);
        assert!(toasts[0].message.contains("Follow"));
    }

    #[tokio::test]
    async fn test_task_update_without_name_is_silent() {
        let h = harness();
        h.dispatcher
            .handle_frame(r#"{"type": "task_history_update", "payload": {"status": "SUCCESS"}}"#)
            .await;

        assert_eq!(h.cache.invalidated.lock().unwrap().len(), 1);
        assert!(h.notifier.toasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_update_invalidates_limits() {
        let h = harness();
        h.dispatcher.handle_frame(r#"{"type": "stats_update", "payload": {}}"#).await;

        assert_eq!(*h.cache.invalidated.lock().unwrap(), vec![keys::LIMITS]);
        assert!(h.notifier.toasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_notification_warning_is_error_styled() {
        let h = harness();
        h.dispatcher
            .handle_frame(
                r#"{"type": "new_notification", "payload": {"level": "warning", "message": "Profile needs re-login"}}"#,
            )
            .await;

        assert_eq!(*h.cache.invalidated.lock().unwrap(), vec![keys::NOTIFICATIONS]);
        let toasts = h.notifier.toasts.lock().unwrap();
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].severity.is_error_styled());
        assert_eq!(toasts[0].message, "Profile needs re-login");
    }

    #[tokio::test]
    async fn test_log_has_no_state_effect() {
        let h = harness();
        h.dispatcher
            .handle_frame(r#"{"type": "log", "payload": {"message": "liked 3 posts"}}"#)
            .await;

        assert_eq!(h.log.entries.lock().unwrap().len(), 1);
        assert!(h.cache.invalidated.lock().unwrap().is_empty());
        assert!(h.notifier.toasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_frames_are_dropped() {
        let h = harness();
        assert!(h.dispatcher.handle_frame("{{{").await.is_none());
        let unknown = h
            .dispatcher
            .handle_frame(r#"{"type": "shiny_new_thing"}"#)
            .await;

        assert!(matches!(unknown, Some(ServerEvent::Unknown { .. })));
        assert!(h.cache.invalidated.lock().unwrap().is_empty());
        assert!(h.notifier.toasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mistyped_payloads_still_invalidate() {
        let h = harness();
        let task = h
            .dispatcher
            .handle_frame(
                r#"{"type": "task_history_update", "payload": {"status": "SUCCESS", "task_name": 12}}"#,
            )
            .await;
        let notification = h
            .dispatcher
            .handle_frame(r#"{"type": "new_notification", "payload": {"message": {"text": "hi"}}}"#)
            .await;

        assert!(task.is_some());
        assert!(notification.is_some());
        assert_eq!(
            *h.cache.invalidated.lock().unwrap(),
            vec![keys::TASK_HISTORY, keys::NOTIFICATIONS]
        );
        // No task name, no task toast; the notification falls back to its default text.
        let toasts = h.notifier.toasts.lock().unwrap();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "You have a new notification");
    }
}
