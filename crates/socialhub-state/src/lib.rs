//! # socialhub-state
//!
//! Client-side state for SocialHub:
//!
//! - [`store::Store`], an injectable observable state container
//! - [`session::SessionStore`], login/logout/profile-switch with durable
//!   persistence of the session identifiers
//! - [`app::AppStore`], the composition root that merges the session and
//!   connection-status slices and keeps the real-time client in step with
//!   the session token
//! - [`api::ApiClient`], the HTTP collaborator for profile switching and
//!   user info

pub mod api;
pub mod app;
pub mod session;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use api::ApiClient;
pub use app::{AppState, AppStore, Collaborators};
pub use session::{Session, SessionStore};
pub use store::{Store, Subscription};
