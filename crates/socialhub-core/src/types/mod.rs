//! Shared domain types.

pub mod account;
pub mod id;

pub use account::{Credentials, UserInfo};
pub use id::{ManagerId, ProfileId};
