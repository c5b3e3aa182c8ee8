//! Real-time client: one reconnecting event-stream connection per session.
//!
//! The client owns at most one socket task and at most one pending reconnect
//! timer. Both live behind a single mutex together with the authorizing
//! token and the backoff counter. The lock is never held across an await or
//! while status listeners run.
//!
//! Each socket task and each timer carries an id. Callbacks from a task or
//! timer that is no longer current are ignored, so a timer never fires after
//! [`RealtimeClient::disconnect`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use socialhub_core::config::RealtimeConfig;
use socialhub_core::error::{AppError, ErrorKind};
use socialhub_core::result::AppResult;

use crate::backoff::ReconnectPolicy;
use crate::dispatcher::EventDispatcher;
use crate::status::ConnectionStatus;
use crate::transport::Transport;

/// Callback invoked after the connection status changes.
pub type StatusListener = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

/// The live socket task.
#[derive(Debug)]
struct SocketTask {
    id: u64,
    cancel: CancellationToken,
}

/// The pending reconnect timer.
#[derive(Debug)]
struct PendingReconnect {
    id: u64,
    delay: Duration,
    handle: JoinHandle<()>,
}

/// Mutable client state.
#[derive(Debug, Default)]
struct ClientState {
    /// Token the connection is authorized by. `None` once disconnected.
    token: Option<String>,
    socket: Option<SocketTask>,
    reconnect: Option<PendingReconnect>,
    /// Reconnect attempts in the current outage.
    attempts: u32,
    next_id: u64,
}

impl ClientState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn cancel_reconnect(&mut self) {
        if let Some(pending) = self.reconnect.take() {
            pending.handle.abort();
            debug!(timer = pending.id, "Pending reconnect cancelled");
        }
    }
}

/// Reconnecting client for the server event stream.
pub struct RealtimeClient {
    /// Endpoint URL without credentials.
    url: String,
    /// Backoff policy.
    policy: ReconnectPolicy,
    /// Socket factory.
    transport: Arc<dyn Transport>,
    /// Inbound event handling.
    dispatcher: Arc<EventDispatcher>,
    state: Mutex<ClientState>,
    status: watch::Sender<ConnectionStatus>,
    listener: Mutex<Option<StatusListener>>,
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("url", &self.url)
            .field("policy", &self.policy)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl RealtimeClient {
    /// Create a new client. No connection is made until [`Self::connect`].
    pub fn new(
        config: &RealtimeConfig,
        transport: Arc<dyn Transport>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Arc<Self> {
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        Arc::new(Self {
            url: config.url.clone(),
            policy: ReconnectPolicy::from_config(config),
            transport,
            dispatcher,
            state: Mutex::new(ClientState::default()),
            status,
            listener: Mutex::new(None),
        })
    }

    /// Register the callback that mirrors status changes elsewhere.
    pub fn set_status_listener(&self, listener: StatusListener) {
        *self.listener.lock().unwrap_or_else(|e| e.into_inner()) = Some(listener);
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Watch status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Reconnect attempts made in the current outage.
    pub fn reconnect_attempts(&self) -> u32 {
        self.lock().attempts
    }

    /// Delay of the pending reconnect timer, if one is scheduled.
    pub fn pending_reconnect(&self) -> Option<Duration> {
        self.lock().reconnect.as_ref().map(|pending| pending.delay)
    }

    /// Open the connection authorized by `token`.
    ///
    /// No-op if a socket already exists or the token is blank. A pending
    /// reconnect timer is superseded by this attempt.
    pub fn connect(self: &Arc<Self>, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            debug!("Refusing to connect without a token");
            return;
        }

        let changed = {
            let mut state = self.lock();
            if state.socket.is_some() {
                debug!("Event stream already open, ignoring connect");
                return;
            }
            state.token = Some(token.to_string());
            state.cancel_reconnect();
            let status = if state.attempts == 0 {
                ConnectionStatus::Connecting
            } else {
                ConnectionStatus::Reconnecting
            };
            self.open_socket(&mut state, token.to_string());
            self.publish(status)
        };
        self.notify_listener(changed);
    }

    /// Close the connection for good.
    ///
    /// Cancels any pending reconnect, resets the backoff counter and drops
    /// the token. The socket task is cancelled before it closes the socket,
    /// so the close does not schedule a reconnect.
    pub fn disconnect(&self) {
        let changed = {
            let mut state = self.lock();
            state.cancel_reconnect();
            state.attempts = 0;
            state.token = None;
            if let Some(socket) = state.socket.take() {
                socket.cancel.cancel();
                info!(socket = socket.id, "Event stream disconnected");
            }
            self.publish(ConnectionStatus::Disconnected)
        };
        self.notify_listener(changed);
    }

    /// Session token transition input.
    ///
    /// Absent to present connects, present to absent disconnects, and a
    /// changed token reconnects with the new credential.
    pub fn on_session_token_changed(self: &Arc<Self>, previous: Option<&str>, current: Option<&str>) {
        let previous = previous.map(str::trim).filter(|t| !t.is_empty());
        let current = current.map(str::trim).filter(|t| !t.is_empty());

        match (previous, current) {
            (None, Some(token)) => self.connect(token),
            (Some(_), None) => self.disconnect(),
            (Some(old), Some(new)) if old != new => {
                info!("Session token rotated, reconnecting event stream");
                self.disconnect();
                self.connect(new);
            }
            _ => {}
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Update the watched status. Called with the state lock held so the
    /// watch value always matches the latest state transition. Returns
    /// whether the status changed.
    fn publish(&self, status: ConnectionStatus) -> bool {
        self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        })
    }

    /// Run the status listener with the latest status. Called without locks.
    fn notify_listener(&self, changed: bool) {
        if !changed {
            return;
        }
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(listener) = listener {
            listener(self.status());
        }
    }

    fn endpoint(&self, token: &str) -> AppResult<String> {
        let mut url = reqwest::Url::parse(&self.url).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid real-time endpoint '{}'", self.url),
                e,
            )
        })?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url.to_string())
    }

    fn open_socket(self: &Arc<Self>, state: &mut ClientState, token: String) {
        let id = state.next_id();
        let cancel = CancellationToken::new();
        tokio::spawn(run_socket(self.clone(), id, token, cancel.clone()));
        state.socket = Some(SocketTask { id, cancel });
        debug!(socket = id, attempt = state.attempts, "Opening event stream");
    }

    fn handle_open(&self, socket_id: u64) {
        let changed = {
            let mut state = self.lock();
            if state.socket.as_ref().map(|s| s.id) != Some(socket_id) {
                return;
            }
            state.attempts = 0;
            state.cancel_reconnect();
            info!(socket = socket_id, "Event stream connected");
            self.publish(ConnectionStatus::Connected)
        };
        self.notify_listener(changed);
    }

    fn handle_close(self: &Arc<Self>, socket_id: u64) {
        let changed = {
            let mut state = self.lock();
            if state.socket.as_ref().map(|s| s.id) != Some(socket_id) {
                return;
            }
            state.socket = None;
            if state.token.is_some() {
                self.schedule_reconnect(&mut state);
                self.publish(ConnectionStatus::Reconnecting)
            } else {
                self.publish(ConnectionStatus::Disconnected)
            }
        };
        self.notify_listener(changed);
    }

    fn schedule_reconnect(self: &Arc<Self>, state: &mut ClientState) {
        state.cancel_reconnect();
        let delay = self.policy.delay(state.attempts);
        let id = state.next_id();
        let client = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            client.fire_reconnect(id);
        });
        state.reconnect = Some(PendingReconnect { id, delay, handle });
        warn!(
            delay_ms = delay.as_millis() as u64,
            attempt = state.attempts + 1,
            "Event stream lost, reconnect scheduled"
        );
    }

    fn fire_reconnect(self: &Arc<Self>, timer_id: u64) {
        let changed = {
            let mut state = self.lock();
            if state.reconnect.as_ref().map(|p| p.id) != Some(timer_id) {
                return;
            }
            state.reconnect = None;
            if state.socket.is_some() {
                return;
            }
            let Some(token) = state.token.clone() else {
                return;
            };
            state.attempts += 1;
            self.open_socket(&mut state, token);
            self.publish(ConnectionStatus::Reconnecting)
        };
        self.notify_listener(changed);
    }
}

/// Socket task: open, pump frames into the dispatcher, report the close.
async fn run_socket(client: Arc<RealtimeClient>, id: u64, token: String, cancel: CancellationToken) {
    let url = match client.endpoint(&token) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Cannot build event stream URL");
            client.handle_close(id);
            return;
        }
    };

    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        opened = client.transport.open(&url) => opened,
    };

    let mut stream = match opened {
        Ok(stream) => stream,
        Err(e) => {
            warn!(socket = id, error = %e, "Event stream connection failed");
            client.handle_close(id);
            return;
        }
    };

    client.handle_open(id);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            frame = stream.next_frame() => Some(frame),
        };

        let Some(frame) = next else {
            stream.close().await;
            debug!(socket = id, "Event stream task cancelled");
            return;
        };

        match frame {
            Some(Ok(text)) => {
                client.dispatcher.handle_frame(&text).await;
            }
            Some(Err(e)) => {
                warn!(socket = id, error = %e, "Event stream error");
                break;
            }
            None => {
                debug!(socket = id, "Event stream closed by server");
                break;
            }
        }
    }

    client.handle_close(id);
}
