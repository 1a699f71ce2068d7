//! In-memory user repository.
//!
//! Records live behind a single `RwLock`, so every write (including its
//! uniqueness checks) is serialized.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::{UserRecord, CONFLICT_EMAIL, CONFLICT_USER, CONFLICT_USERNAME};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by exact username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;

    /// Find user by email address (case-insensitive)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Insert a new user, rejecting duplicate ids, usernames and emails
    async fn insert(&self, user: UserRecord) -> AppResult<UserRecord>;

    /// List all users in registration order
    async fn list(&self) -> AppResult<Vec<UserRecord>>;
}

#[derive(Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    by_username: HashMap<String, String>,
    by_email: HashMap<String, String>,
    order: Vec<String>,
}

/// Concrete in-memory implementation of UserRepository
#[derive(Default)]
pub struct UserStore {
    tables: RwLock<Tables>,
}

impl UserStore {
    /// Create new empty repository instance
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_key(email: &str) -> String {
    email.to_ascii_lowercase()
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(&email_key(email))
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn insert(&self, user: UserRecord) -> AppResult<UserRecord> {
        let mut tables = self.tables.write().await;

        if tables.users.contains_key(&user.id) {
            return Err(AppError::conflict(CONFLICT_USER));
        }
        if tables.by_username.contains_key(&user.username) {
            return Err(AppError::conflict(CONFLICT_USERNAME));
        }
        let email = email_key(&user.email);
        if tables.by_email.contains_key(&email) {
            return Err(AppError::conflict(CONFLICT_EMAIL));
        }

        tables.by_username.insert(user.username.clone(), user.id.clone());
        tables.by_email.insert(email, user.id.clone());
        tables.order.push(user.id.clone());
        tables.users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn list(&self) -> AppResult<Vec<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .order
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, username: &str, email: &str) -> UserRecord {
        UserRecord::new(
            id.to_string(),
            username.to_string(),
            email.to_string(),
            "hash".to_string(),
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = UserStore::new();
        store.insert(record("1", "alice", "Alice@Example.com")).await.unwrap();

        assert_eq!(store.find_by_username("alice").await.unwrap().unwrap().id, "1");
        assert!(store.find_by_email("alice@example.com").await.unwrap().is_some());
        assert!(store.find_by_username("ALICE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicates_rejected() {
        let store = UserStore::new();
        store.insert(record("1", "alice", "alice@example.com")).await.unwrap();

        let err = store.insert(record("2", "alice", "other@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref e) if e == CONFLICT_USERNAME));

        let err = store.insert(record("3", "bob", "ALICE@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref e) if e == CONFLICT_EMAIL));

        let err = store.insert(record("1", "carol", "carol@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref e) if e == CONFLICT_USER));

        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_keeps_registration_order() {
        let store = UserStore::new();
        for (id, name) in [("b", "bob"), ("a", "alice"), ("c", "carol")] {
            store
                .insert(record(id, name, &format!("{}@example.com", name)))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["bob", "alice", "carol"]);
    }
}
