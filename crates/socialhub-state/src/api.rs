//! HTTP API client for profile switching and user info.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use socialhub_core::config::ApiConfig;
use socialhub_core::error::AppError;
use socialhub_core::result::AppResult;
use socialhub_core::traits::{ProfileSwitcher, UserInfoFetcher};
use socialhub_core::types::{Credentials, ProfileId, UserInfo};

/// Request body of `POST /auth/switch-profile`.
#[derive(Debug, Serialize)]
struct SwitchProfileRequest {
    profile_id: ProfileId,
}

/// Bearer-authenticated client for the SocialHub HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ProfileSwitcher for ApiClient {
    async fn switch_profile(&self, token: &str, profile_id: ProfileId) -> AppResult<Credentials> {
        let url = self.url("auth/switch-profile");
        debug!(%url, profile_id = %profile_id, "Requesting profile switch");

        let credentials: Credentials = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&SwitchProfileRequest { profile_id })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if credentials.access_token.trim().is_empty() {
            return Err(AppError::external_service(
                "Profile switch returned an empty token",
            ));
        }

        info!(profile_id = %credentials.active_profile_id, "Profile switch accepted");
        Ok(credentials)
    }
}

#[async_trait]
impl UserInfoFetcher for ApiClient {
    async fn fetch_user_info(&self, token: &str) -> AppResult<UserInfo> {
        let url = self.url("users/me");
        let info = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(info)
    }
}
