//! Directory client for user-service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use common::{AppError, AppResult};
use domain::UserRecord;
use user_service_lib::UserService;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Directory operations needed by the resolver.
///
/// The resolver owns no storage; everything persistent goes through here.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find user by username or email
    async fn find(&self, identifier: &str) -> AppResult<Option<UserRecord>>;

    /// Check whether a username or email is already registered
    async fn exists(&self, identifier: &str) -> AppResult<bool>;

    /// Store a newly registered user.
    ///
    /// Fails with `Conflict` if the username or email was taken meanwhile.
    async fn insert(&self, user: UserRecord) -> AppResult<UserRecord>;
}

/// In-process client wrapper for user-service.
pub struct UserClient {
    users: Arc<dyn UserService>,
}

impl UserClient {
    /// Wrap an embedded user service.
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for UserClient {
    async fn find(&self, identifier: &str) -> AppResult<Option<UserRecord>> {
        self.users.find_by_identifier(identifier).await
    }

    async fn exists(&self, identifier: &str) -> AppResult<bool> {
        self.users.is_taken(identifier).await
    }

    async fn insert(&self, user: UserRecord) -> AppResult<UserRecord> {
        debug!(user_id = %user.id, "Storing user in directory");
        match self.users.create_user(user).await {
            Ok(user) => Ok(user),
            Err(AppError::Conflict(what)) => Err(AppError::Conflict(what)),
            Err(e) => Err(AppError::internal(format!("directory insert failed: {}", e))),
        }
    }
}
