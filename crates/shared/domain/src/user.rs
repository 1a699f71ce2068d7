//! User domain entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{FIELD_DOB, FIELD_ORDER};
use crate::error::DomainResult;
use crate::identity;

/// Registered user.
///
/// The age is never stored; it is derived from `date_of_birth` on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "dob")]
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new record stamped with the current time
    pub fn new(
        id: String,
        username: String,
        email: String,
        password_hash: String,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            date_of_birth,
            created_at: Utc::now(),
        }
    }

    /// Age in whole years as of `as_of`
    pub fn age_on(&self, as_of: NaiveDate) -> DomainResult<u32> {
        identity::age_between(self.date_of_birth, as_of)
    }

    /// Age in whole years as of today
    pub fn age(&self) -> DomainResult<u32> {
        identity::age_today(self.date_of_birth)
    }
}

/// Registration payload as received from a client.
///
/// Transient: only the hashed password ever reaches a [`UserRecord`].
#[derive(Clone, Deserialize, Validate)]
pub struct RegistrationInput {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(rename = "dob")]
    pub date_of_birth: String,
}

// Don't expose the raw password in debug output
impl std::fmt::Debug for RegistrationInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("date_of_birth", &self.date_of_birth)
            .finish()
    }
}

impl RegistrationInput {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        date_of_birth: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            date_of_birth: date_of_birth.into(),
        }
    }

    /// Trim surrounding whitespace from the identity fields.
    ///
    /// The password is left untouched.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self.date_of_birth = self.date_of_birth.trim().to_string();
        self
    }

    /// Check every field and report one error per invalid field.
    ///
    /// Errors are ordered username, email, password, dob. The date of birth is
    /// checked against `as_of` so that future dates are rejected.
    pub fn field_errors(&self, as_of: NaiveDate) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if let Err(report) = self.validate() {
            let by_field = report.field_errors();
            for field in FIELD_ORDER {
                let Some(first) = by_field.get(*field).and_then(|list| list.first()) else {
                    continue;
                };
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                errors.push(FieldError::new(*field, message));
            }
        }

        if let Err(e) = identity::parse_date(&self.date_of_birth)
            .and_then(|dob| identity::age_between(dob, as_of))
        {
            errors.push(FieldError::new(FIELD_DOB, e.to_string()));
        }

        errors
    }

    /// Parsed date of birth
    pub fn parsed_date_of_birth(&self) -> DomainResult<NaiveDate> {
        identity::parse_date(&self.date_of_birth)
    }
}

/// Login credentials. `identifier` is a username or an email.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of a registration attempt.
///
/// Validation problems are data, not errors: `errors` is non-empty and
/// `user` is absent.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub errors: Vec<FieldError>,
    pub user: Option<UserView>,
    #[serde(skip)]
    record: Option<UserRecord>,
}

impl RegistrationResponse {
    /// Successful registration
    pub fn registered(user: UserRecord) -> Self {
        Self {
            errors: Vec::new(),
            user: Some(UserView::from(&user)),
            record: Some(user),
        }
    }

    /// Rejected registration
    pub fn rejected(errors: Vec<FieldError>) -> Self {
        Self {
            errors,
            user: None,
            record: None,
        }
    }

    /// Check if the registration produced a user
    pub fn is_registered(&self) -> bool {
        self.record.is_some()
    }

    /// The registered record, if any
    pub fn record(&self) -> Option<&UserRecord> {
        self.record.as_ref()
    }

    /// Consume and return the registered record
    pub fn into_record(self) -> Option<UserRecord> {
        self.record
    }
}

/// User projection (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    /// Opaque user identifier
    pub id: String,
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Date of birth (YYYY-MM-DD)
    pub dob: String,
    /// Age in whole years, absent if it cannot be derived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            dob: user.date_of_birth.format("%Y-%m-%d").to_string(),
            age: user.age().ok(),
            created_at: user.created_at,
        }
    }
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        UserView::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn valid_input() -> RegistrationInput {
        RegistrationInput::new("alice", "alice@example.com", "s3cret-pass", "2000-06-15")
    }

    #[test]
    fn test_valid_input_has_no_errors() {
        assert!(valid_input().field_errors(as_of()).is_empty());
    }

    #[test]
    fn test_empty_username_reports_single_error() {
        let mut input = valid_input();
        input.username = String::new();

        let errors = input.field_errors(as_of());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "username");
    }

    #[test]
    fn test_whitespace_username_is_empty_after_normalizing() {
        let mut input = valid_input();
        input.username = "   ".to_string();

        let errors = input.normalized().field_errors(as_of());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "username");
    }

    #[test]
    fn test_errors_follow_field_order() {
        let input = RegistrationInput::new("", "nope", "", "someday");

        let fields: Vec<_> = input
            .field_errors(as_of())
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["username", "email", "password", "dob"]);
    }

    #[test]
    fn test_future_dob_rejected() {
        let mut input = valid_input();
        input.date_of_birth = "2030-01-01".to_string();

        let errors = input.field_errors(as_of());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "dob");
        assert!(errors[0].message.contains("future"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", valid_input());
        assert!(!rendered.contains("s3cret-pass"));
        assert!(rendered.contains("[REDACTED]"));

        let rendered = format!("{:?}", Credentials::new("alice", "s3cret-pass"));
        assert!(!rendered.contains("s3cret-pass"));
    }

    #[test]
    fn test_record_age_is_derived() {
        let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        let user = UserRecord::new(
            "id".into(),
            "alice".into(),
            "Alice@Example.com".into(),
            "hash".into(),
            dob,
        );

        assert_eq!(user.age_on(as_of()).unwrap(), 24);
    }

    #[test]
    fn test_view_hides_password_hash() {
        let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        let user = UserRecord::new(
            "id".into(),
            "alice".into(),
            "alice@example.com".into(),
            "secret-hash".into(),
            dob,
        );

        let json = serde_json::to_string(&RegistrationResponse::registered(user.clone())).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"dob\":\"2000-06-15\""));
        assert!(json.contains("\"errors\":[]"));

        // Records are write-only on the wire: the hash never leaves
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
