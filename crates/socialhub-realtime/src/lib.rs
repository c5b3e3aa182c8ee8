//! # socialhub-realtime
//!
//! Real-time event client for the SocialHub dashboard. Provides:
//!
//! - A single reconnecting WebSocket connection per session, authenticated
//!   by the session token
//! - Exponential reconnect backoff, reset on every successful open
//! - Typed decoding of server events
//! - Dispatch of events into query-cache invalidations and toasts

pub mod backoff;
pub mod client;
pub mod dispatcher;
pub mod event;
pub mod sink;
pub mod status;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use client::RealtimeClient;
pub use dispatcher::EventDispatcher;
pub use event::ServerEvent;
pub use status::ConnectionStatus;
pub use transport::{FrameStream, Transport, WsTransport};
