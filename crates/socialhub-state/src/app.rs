//! Application state composition.
//!
//! [`AppStore`] owns the single observable [`Store`] holding the session and
//! connection-status slices, and wires the real-time client to it:
//!
//! - client status changes are mirrored into `connection`;
//! - session token transitions drive the client's connect, disconnect and
//!   reconnect.

use std::sync::Arc;

use tracing::{debug, info};

use socialhub_core::result::AppResult;
use socialhub_core::traits::{
    KeyValueStore, Notifier, ProfileSwitcher, QueryCache, UserInfoFetcher,
};
use socialhub_realtime::{ConnectionStatus, RealtimeClient};

use crate::session::{Session, SessionStore};
use crate::store::{Store, Subscription};

/// Combined client state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub session: Session,
    pub connection: ConnectionStatus,
}

/// External collaborators of the session store.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn KeyValueStore>,
    pub cache: Arc<dyn QueryCache>,
    pub notifier: Arc<dyn Notifier>,
    pub switcher: Arc<dyn ProfileSwitcher>,
    pub user_info: Arc<dyn UserInfoFetcher>,
}

/// Composition root of the client state.
#[derive(Debug)]
pub struct AppStore {
    store: Arc<Store<AppState>>,
    session: SessionStore,
    realtime: Arc<RealtimeClient>,
    _token_reaction: Subscription<AppState>,
}

impl AppStore {
    /// Restore the persisted session and wire `realtime` to the store.
    ///
    /// Does not connect. Call [`AppStore::start`] for that.
    pub fn new(collaborators: Collaborators, realtime: Arc<RealtimeClient>) -> AppResult<Self> {
        let session = Session::restore(collaborators.storage.as_ref())?;
        debug!(authenticated = session.is_authenticated(), "Session restored");

        let store = Store::new(AppState {
            session,
            connection: realtime.status(),
        });

        let weak = Arc::downgrade(&store);
        realtime.set_status_listener(Arc::new(move |status| {
            if let Some(store) = weak.upgrade() {
                store.set_state(|s| s.connection = status);
            }
        }));

        let client = realtime.clone();
        let token_reaction = store.subscribe(Arc::new(move |prev: &AppState, cur: &AppState| {
            if prev.session.token != cur.session.token {
                client.on_session_token_changed(
                    prev.session.token.as_deref(),
                    cur.session.token.as_deref(),
                );
            }
        }));

        let session = SessionStore::new(
            store.clone(),
            collaborators.storage,
            collaborators.cache,
            collaborators.notifier,
            collaborators.switcher,
            collaborators.user_info,
        );

        Ok(Self {
            store,
            session,
            realtime,
            _token_reaction: token_reaction,
        })
    }

    /// Connect the event stream if a session was restored.
    pub fn start(&self) {
        if let Some(token) = self.store.select(|s| s.session.token.clone()) {
            info!("Resuming event stream for restored session");
            self.realtime.connect(&token);
        }
    }

    /// Close the event stream. The session is kept.
    pub fn shutdown(&self) {
        self.realtime.disconnect();
    }

    /// Session operations.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Snapshot of the whole state.
    pub fn state(&self) -> AppState {
        self.store.get_state()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.store.select(|s| s.connection)
    }

    /// The underlying observable store, for subscribing to changes.
    pub fn store(&self) -> &Arc<Store<AppState>> {
        &self.store
    }

    pub fn realtime(&self) -> &Arc<RealtimeClient> {
        &self.realtime
    }
}
