//! Session model and session store operations.

pub mod model;
pub mod store;

pub use model::Session;
pub use store::SessionStore;
