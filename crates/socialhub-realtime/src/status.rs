//! Connection status definitions.

use serde::{Deserialize, Serialize};

/// Observable state of the real-time connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No socket and no reconnect pending.
    #[default]
    Disconnected,
    /// First attempt for this session is in progress.
    Connecting,
    /// Connection was lost; an attempt is scheduled or in progress.
    Reconnecting,
    /// Socket is open and receiving events.
    Connected,
}

impl ConnectionStatus {
    /// Converts to string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Reconnecting => "reconnecting",
            Self::Connected => "connected",
        }
    }

    /// Whether the socket is open.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}
