//! Account payloads exchanged with the API.

use serde::{Deserialize, Serialize};

use super::id::{ManagerId, ProfileId};

/// Session credentials issued on login or after a profile switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Opaque bearer token.
    pub access_token: String,
    /// Owning account.
    pub manager_id: ManagerId,
    /// Profile the token acts as.
    pub active_profile_id: ProfileId,
}

impl Credentials {
    /// Build credentials from their parts.
    pub fn new(
        access_token: impl Into<String>,
        manager_id: impl Into<ManagerId>,
        active_profile_id: impl Into<ProfileId>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            manager_id: manager_id.into(),
            active_profile_id: active_profile_id.into(),
        }
    }
}

/// Snapshot of the current user as last fetched from the API.
///
/// Decoding is tolerant: every field is optional and unknown fields are kept
/// in `extra`, since the shape is owned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tasks_used: Option<u64>,
    #[serde(default)]
    pub tasks_limit: Option<u64>,
    #[serde(default)]
    pub profiles_used: Option<u64>,
    #[serde(default)]
    pub profiles_limit: Option<u64>,
    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_wire_names() {
        let creds: Credentials = serde_json::from_str(
            r#"{"access_token": "t1", "manager_id": 7, "active_profile_id": 42}"#,
        )
        .unwrap();
        assert_eq!(creds, Credentials::new("t1", 7, 42));
    }

    #[test]
    fn test_user_info_keeps_unknown_fields() {
        let info: UserInfo = serde_json::from_str(
            r#"{"username": "ana", "tasks_used": 3, "plan": "pro"}"#,
        )
        .unwrap();
        assert_eq!(info.username.as_deref(), Some("ana"));
        assert_eq!(info.tasks_used, Some(3));
        assert_eq!(info.tasks_limit, None);
        assert_eq!(info.extra.get("plan"), Some(&serde_json::json!("pro")));
    }
}
