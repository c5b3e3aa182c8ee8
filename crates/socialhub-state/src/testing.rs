//! Test doubles shared by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use socialhub_cache::MemoryQueryCache;
use socialhub_core::config::{QueryCacheConfig, RealtimeConfig};
use socialhub_core::error::AppError;
use socialhub_core::result::AppResult;
use socialhub_core::traits::{
    ActivityLog, Notifier, ProfileSwitcher, Toast, UserInfoFetcher,
};
use socialhub_core::types::{Credentials, ProfileId, UserInfo};
use socialhub_realtime::{EventDispatcher, FrameStream, RealtimeClient, Transport};

use crate::app::{AppState, AppStore, Collaborators};
use crate::session::SessionStore;
use crate::storage::MemoryStorage;
use crate::store::Store;

/// Let spawned socket tasks run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Records every toast shown or updated.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
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
pub struct NullActivityLog;

impl ActivityLog for NullActivityLog {
    fn record(&self, _payload: &serde_json::Value) {}
}

/// Canned reply for a mocked API call, counting the calls made.
#[derive(Debug)]
pub struct Scripted<T> {
    calls: AtomicUsize,
    reply: Mutex<AppResult<T>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl<T: Clone> Scripted<T> {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Mutex::new(Err(AppError::internal("no scripted reply"))),
            gate: Mutex::new(None),
        }
    }

    pub fn respond_with(&self, reply: AppResult<T>) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Hold every later call until the returned gate is notified once.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    async fn call(&self) -> AppResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.reply.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileSwitcher for Scripted<Credentials> {
    async fn switch_profile(&self, _token: &str, _profile_id: ProfileId) -> AppResult<Credentials> {
        self.call().await
    }
}

#[async_trait]
impl UserInfoFetcher for Scripted<UserInfo> {
    async fn fetch_user_info(&self, _token: &str) -> AppResult<UserInfo> {
        self.call().await
    }
}

/// Transport whose sockets open immediately and stay open.
#[derive(Debug, Default)]
pub struct OpenTransport {
    urls: Mutex<Vec<String>>,
    servers: Mutex<Vec<mpsc::UnboundedSender<String>>>,
}

impl OpenTransport {
    pub fn open_count(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

struct OpenStream {
    rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl FrameStream for OpenStream {
    async fn next_frame(&mut self) -> Option<AppResult<String>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) {}
}

#[async_trait]
impl Transport for OpenTransport {
    async fn open(&self, url: &str) -> AppResult<Box<dyn FrameStream>> {
        self.urls.lock().unwrap().push(url.to_string());
        let (tx, rx) = mpsc::unbounded_channel();
        self.servers.lock().unwrap().push(tx);
        Ok(Box::new(OpenStream { rx }))
    }
}

/// Session store over in-memory collaborators.
pub struct Fixture {
    pub storage: Arc<MemoryStorage>,
    pub cache: Arc<MemoryQueryCache>,
    pub notifier: Arc<RecordingNotifier>,
    pub switcher: Arc<Scripted<Credentials>>,
    pub user_info: Arc<Scripted<UserInfo>>,
    pub session: SessionStore,
}

pub fn fixture() -> Fixture {
    let storage = Arc::new(MemoryStorage::new());
    let cache = Arc::new(MemoryQueryCache::new(&QueryCacheConfig::default()));
    let notifier = Arc::new(RecordingNotifier::default());
    let switcher = Arc::new(Scripted::new());
    let user_info = Arc::new(Scripted::new());

    let session = SessionStore::new(
        Store::new(AppState::default()),
        storage.clone(),
        cache.clone(),
        notifier.clone(),
        switcher.clone(),
        user_info.clone(),
    );

    Fixture {
        storage,
        cache,
        notifier,
        switcher,
        user_info,
        session,
    }
}

/// Full app store with a real-time client over [`OpenTransport`].
pub struct AppFixture {
    pub transport: Arc<OpenTransport>,
    pub switcher: Arc<Scripted<Credentials>>,
    pub app: AppStore,
}

/// Build an app store. `seed` runs against storage before the session is
/// restored.
pub fn app_fixture(seed: impl FnOnce(&MemoryStorage)) -> AppFixture {
    let storage = Arc::new(MemoryStorage::new());
    seed(&storage);

    let cache = Arc::new(MemoryQueryCache::new(&QueryCacheConfig::default()));
    let notifier = Arc::new(RecordingNotifier::default());
    let switcher = Arc::new(Scripted::new());
    let transport = Arc::new(OpenTransport::default());

    let dispatcher = Arc::new(EventDispatcher::new(
        cache.clone(),
        notifier.clone(),
        Arc::new(NullActivityLog),
    ));
    let realtime = RealtimeClient::new(&RealtimeConfig::default(), transport.clone(), dispatcher);

    let app = AppStore::new(
        Collaborators {
            storage,
            cache,
            notifier,
            switcher: switcher.clone(),
            user_info: Arc::new(Scripted::<UserInfo>::new()),
        },
        realtime,
    )
    .unwrap();

    AppFixture {
        transport,
        switcher,
        app,
    }
}
