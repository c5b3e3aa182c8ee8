//! Session store: login, logout and profile switching.
//!
//! Ordering rules:
//!
//! - durable storage is written before the in-memory session, so storage
//!   never holds a session that memory does not;
//! - the query cache is reset after the in-memory session changed, so any
//!   refetch already sees the new identity.

use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info, warn};

use socialhub_cache::keys;
use socialhub_core::error::AppError;
use socialhub_core::result::AppResult;
use socialhub_core::traits::{
    KeyValueStore, Notifier, ProfileSwitcher, QueryCache, Toast, UserInfoFetcher,
};
use socialhub_core::types::{Credentials, ProfileId, UserInfo};

use crate::app::AppState;
use crate::storage::{ACTIVE_PROFILE_KEY, MANAGER_ID_KEY, SESSION_KEYS, TOKEN_KEY};
use crate::store::Store;

use super::model::Session;

/// Toast identity used for the profile-switch progress toast.
const SWITCH_PROFILE_TOAST: &str = "switch-profile";

/// Single writer of the session slice.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: Arc<Store<AppState>>,
    storage: Arc<dyn KeyValueStore>,
    cache: Arc<dyn QueryCache>,
    notifier: Arc<dyn Notifier>,
    switcher: Arc<dyn ProfileSwitcher>,
    user_info: Arc<dyn UserInfoFetcher>,
}

impl SessionStore {
    /// Creates a new session store over the session slice of `store`.
    pub fn new(
        store: Arc<Store<AppState>>,
        storage: Arc<dyn KeyValueStore>,
        cache: Arc<dyn QueryCache>,
        notifier: Arc<dyn Notifier>,
        switcher: Arc<dyn ProfileSwitcher>,
        user_info: Arc<dyn UserInfoFetcher>,
    ) -> Self {
        Self {
            store,
            storage,
            cache,
            notifier,
            switcher,
            user_info,
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.store.select(|s| s.session.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.select(|s| s.session.is_authenticated())
    }

    /// Persist `credentials` and make them the current session.
    pub fn login(&self, credentials: &Credentials) -> AppResult<()> {
        if credentials.access_token.trim().is_empty() {
            return Err(AppError::validation("Access token must not be empty"));
        }

        self.storage.set(TOKEN_KEY, &credentials.access_token)?;
        self.storage
            .set(MANAGER_ID_KEY, &credentials.manager_id.to_string())?;
        self.storage
            .set(ACTIVE_PROFILE_KEY, &credentials.active_profile_id.to_string())?;

        self.store.set_state(|s| s.session.apply(credentials));

        info!(
            manager_id = %credentials.manager_id,
            profile_id = %credentials.active_profile_id,
            "Logged in"
        );
        Ok(())
    }

    /// Clear the persisted and in-memory session and reset the query cache.
    ///
    /// Safe to call when already logged out. The in-memory session and the
    /// cache are cleared even if storage fails; the first storage error is
    /// returned afterwards.
    pub async fn logout(&self) -> AppResult<()> {
        let mut storage_error = None;
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove session key");
                storage_error.get_or_insert(e);
            }
        }

        self.store.set_state(|s| s.session = Session::default());
        self.cache.reset().await;

        info!("Logged out");
        storage_error.map_or(Ok(()), Err)
    }

    /// Log out only if currently authenticated.
    ///
    /// Returns whether a logout happened. Meant for failed-request handlers
    /// that may fire several times for one expired token.
    pub async fn set_unauthenticated(&self) -> AppResult<bool> {
        if !self.is_authenticated() {
            debug!("Already unauthenticated");
            return Ok(false);
        }
        self.logout().await?;
        Ok(true)
    }

    /// Switch the active profile.
    ///
    /// Returns `Ok(false)` without any network call if `profile_id` already
    /// is the active profile. On success the new credentials are applied and
    /// the query cache is reset once. On failure the session is unchanged,
    /// an error toast is shown and the error is returned.
    pub async fn set_active_profile(&self, profile_id: ProfileId) -> AppResult<bool> {
        let (token, current) = self
            .store
            .select(|s| (s.session.token.clone(), s.session.active_profile_id));

        if current == Some(profile_id) {
            debug!(profile_id = %profile_id, "Profile already active");
            return Ok(false);
        }

        let Some(token) = token else {
            return Err(AppError::authentication("Log in before switching profiles"));
        };

        self.notifier
            .show(Toast::loading("Switching profile...").with_id(SWITCH_PROFILE_TOAST));

        let credentials = match self.switcher.switch_profile(&token, profile_id).await {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(profile_id = %profile_id, error = %e, "Profile switch failed");
                self.notifier.update(
                    SWITCH_PROFILE_TOAST,
                    Toast::error(format!("Could not switch profile: {}", e.message)),
                );
                return Err(e);
            }
        };

        if let Err(e) = self.login(&credentials) {
            self.notifier.update(
                SWITCH_PROFILE_TOAST,
                Toast::error(format!("Could not switch profile: {}", e.message)),
            );
            return Err(e);
        }
        self.cache.reset().await;

        self.notifier.update(
            SWITCH_PROFILE_TOAST,
            Toast::success(format!(
                "Switched to profile {}",
                credentials.active_profile_id
            )),
        );
        Ok(true)
    }

    /// Replace the cached user snapshot.
    pub fn set_user_info(&self, info: UserInfo) {
        self.store.set_state(|s| s.session.user_info = Some(info));
    }

    /// Fetch the current user through the query cache and store it.
    ///
    /// Returns `Ok(None)` when logged out, or when the session changed while
    /// the request was in flight; the answer for the old token is dropped.
    /// A rejected token logs the session out if it is still the current one.
    pub async fn refresh_user_info(&self) -> AppResult<Option<UserInfo>> {
        let Some(token) = self.store.select(|s| s.session.token.clone()) else {
            return Ok(None);
        };

        let fetcher = self.user_info.clone();
        let request_token = token.clone();
        let fetch = async move {
            let info = fetcher.fetch_user_info(&request_token).await?;
            Ok::<_, AppError>(serde_json::to_value(info)?)
        }
        .boxed();

        let value = match self.cache.fetch(keys::CURRENT_USER, fetch).await {
            Ok(value) => value,
            Err(e) if e.is_authentication() => {
                if self.holds_token(&token) {
                    warn!("Current user request rejected, logging out");
                    self.set_unauthenticated().await?;
                } else {
                    debug!("Rejected token was already replaced");
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let info: UserInfo = serde_json::from_value(value)?;
        let mut applied = false;
        self.store.set_state(|s| {
            if s.session.token.as_deref() == Some(token.as_str()) {
                s.session.user_info = Some(info.clone());
                applied = true;
            }
        });

        if !applied {
            debug!("Session changed during user info refresh, dropping result");
            return Ok(None);
        }
        Ok(Some(info))
    }

    fn holds_token(&self, token: &str) -> bool {
        self.store
            .select(|s| s.session.token.as_deref() == Some(token))
    }
}
