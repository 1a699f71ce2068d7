//! Per-operation collaborator sets.
//!
//! Each operation only sees the collaborators it needs: login cannot publish
//! events and preview cannot touch the directory.

use std::sync::Arc;

use tokio::sync::OnceCell;

use common::AppResult;

use crate::client::UserDirectory;
use crate::events::EventBroadcaster;
use crate::hashing::CredentialHasher;

/// Password hashed once to produce the decoy for unknown accounts
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Collaborators for `register`.
#[derive(Clone)]
pub struct RegistrationContext {
    pub directory: Arc<dyn UserDirectory>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub events: EventBroadcaster,
}

/// Collaborators for `login`.
#[derive(Clone)]
pub struct LoginContext {
    pub directory: Arc<dyn UserDirectory>,
    pub hasher: Arc<dyn CredentialHasher>,
    decoy_hash: Arc<OnceCell<String>>,
}

impl LoginContext {
    pub fn new(directory: Arc<dyn UserDirectory>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            directory,
            hasher,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Hash verified when the account does not exist, created on first use.
    pub async fn decoy_hash(&self) -> AppResult<&str> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash(DECOY_PASSWORD))
            .await?;
        Ok(hash.as_str())
    }
}

/// Collaborators for `preview`.
#[derive(Clone)]
pub struct PreviewContext {
    pub hasher: Arc<dyn CredentialHasher>,
}
