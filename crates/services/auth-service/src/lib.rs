//! Auth Service Library
//!
//! Registration, login and new-user subscriptions on top of user-service.
//! Passwords are hashed with Argon2id and new users are fanned out to every
//! open subscription feed.

pub mod client;
pub mod config;
pub mod events;
pub mod hashing;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::AppResult;
use user_service_lib::UserService;

use crate::client::UserClient;
use crate::config::AuthServiceConfig;
use crate::events::EventBroadcaster;
use crate::hashing::Argon2Hasher;
use crate::service::{Registrar, UserDirectoryResolver};

/// Wired resolver plus the broadcaster its subscriptions read from.
#[derive(Clone)]
pub struct DirectoryRuntime {
    pub resolver: Arc<dyn UserDirectoryResolver>,
    pub events: EventBroadcaster,
}

impl DirectoryRuntime {
    /// Validate `config` and wire the resolver against `users`.
    pub fn start(config: AuthServiceConfig, users: Arc<dyn UserService>) -> AppResult<Self> {
        config.validate()?;

        let hasher = Argon2Hasher::new(config.hashing)?;
        let events = EventBroadcaster::new(config.feed);
        let directory = UserClient::new(users);

        info!(
            hash_cost = hasher.cost(),
            feed_buffer = events.buffer_size(),
            "User directory started"
        );

        let resolver = Registrar::new(Arc::new(directory), Arc::new(hasher), events.clone());
        Ok(Self {
            resolver: Arc::new(resolver),
            events,
        })
    }

    /// Run as an embedded component with an in-memory store and env config.
    pub fn embedded() -> AppResult<Self> {
        Self::start(AuthServiceConfig::from_env(), user_service_lib::in_memory())
    }

    /// Stop publishing; open feeds drain and end.
    pub fn shutdown(&self) {
        self.events.shutdown();
    }
}
