//! # socialhub-core
//!
//! Core crate for the SocialHub client. Contains configuration schemas,
//! typed identifiers, the collaborator traits the session and real-time
//! layers are written against, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SocialHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
