//! User service - Handles user-related business logic.
//!
//! SOLID (SRP): Handles user lookup and storage use cases only.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use common::AppResult;
use domain::UserRecord;

use crate::repository::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Find user by username or email
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<UserRecord>>;

    /// Check whether a username or email is already registered
    async fn is_taken(&self, identifier: &str) -> AppResult<bool>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<UserRecord>>;

    /// Store a new user (internal use - password already hashed)
    async fn create_user(&self, user: UserRecord) -> AppResult<UserRecord>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<UserRecord>> {
        // Usernames take precedence over emails
        if let Some(user) = self.repo.find_by_username(identifier).await? {
            return Ok(Some(user));
        }
        self.repo.find_by_email(identifier).await
    }

    async fn is_taken(&self, identifier: &str) -> AppResult<bool> {
        Ok(self.find_by_identifier(identifier).await?.is_some())
    }

    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        self.repo.list().await
    }

    async fn create_user(&self, user: UserRecord) -> AppResult<UserRecord> {
        let user = self.repo.insert(user).await?;
        debug!(user_id = %user.id, username = %user.username, "User stored");
        Ok(user)
    }
}
