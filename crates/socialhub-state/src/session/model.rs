//! The in-memory session.

use serde::{Deserialize, Serialize};
use tracing::warn;

use socialhub_core::result::AppResult;
use socialhub_core::traits::storage::KeyValueStore;
use socialhub_core::types::{Credentials, ManagerId, ProfileId, UserInfo};

use crate::storage::{ACTIVE_PROFILE_KEY, MANAGER_ID_KEY, TOKEN_KEY};

/// Who is logged in, and as which managed profile.
///
/// `token` is the source of truth for authentication. The other fields are
/// only meaningful while a token is present and are cleared with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub manager_id: Option<ManagerId>,
    pub active_profile_id: Option<ProfileId>,
    /// Last fetched snapshot. Never persisted.
    pub user_info: Option<UserInfo>,
}

impl Session {
    /// Whether a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Replace the identity fields with `credentials`.
    ///
    /// `user_info` is kept only while the manager and profile stay the same.
    pub fn apply(&mut self, credentials: &Credentials) {
        if self.manager_id != Some(credentials.manager_id)
            || self.active_profile_id != Some(credentials.active_profile_id)
        {
            self.user_info = None;
        }
        self.token = Some(credentials.access_token.clone());
        self.manager_id = Some(credentials.manager_id);
        self.active_profile_id = Some(credentials.active_profile_id);
    }

    /// Rebuild the session persisted in `storage`.
    ///
    /// Without a token the session is empty, whatever else is stored. Ids
    /// that do not parse are dropped with a warning.
    pub fn restore(storage: &dyn KeyValueStore) -> AppResult<Self> {
        let Some(token) = storage.get(TOKEN_KEY)?.filter(|t| !t.trim().is_empty()) else {
            return Ok(Self::default());
        };

        Ok(Self {
            token: Some(token),
            manager_id: parse_id(storage, MANAGER_ID_KEY)?,
            active_profile_id: parse_id(storage, ACTIVE_PROFILE_KEY)?,
            user_info: None,
        })
    }
}

fn parse_id<T: std::str::FromStr>(storage: &dyn KeyValueStore, key: &str) -> AppResult<Option<T>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    match raw.parse() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable stored id");
            Ok(None)
        }
    }
}
