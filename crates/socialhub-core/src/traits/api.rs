//! Network collaborators of the session store.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{Credentials, ProfileId, UserInfo};

/// Asks the server to switch the active profile.
#[async_trait]
pub trait ProfileSwitcher: Send + Sync + std::fmt::Debug + 'static {
    /// Switch to `profile_id` using the current `token`; returns the new credentials.
    async fn switch_profile(&self, token: &str, profile_id: ProfileId) -> AppResult<Credentials>;
}

/// Fetches the current user's snapshot.
#[async_trait]
pub trait UserInfoFetcher: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch user info for the session identified by `token`.
    async fn fetch_user_info(&self, token: &str) -> AppResult<UserInfo>;
}
