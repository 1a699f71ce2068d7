//! User Service Library
//!
//! This crate owns user storage for the directory: an in-memory repository
//! behind the `UserService` trait. It is embedded by the resolver service and
//! the combined binary.

pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

pub use repository::{UserRepository, UserStore};
pub use service::{UserManager, UserService};

/// Build a user service backed by a fresh in-memory store.
pub fn in_memory() -> Arc<dyn UserService> {
    info!("Using in-memory user store");
    let repo = Arc::new(UserStore::new());
    Arc::new(UserManager::new(repo))
}
