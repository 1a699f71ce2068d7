//! User directory resolver - registration, login and read-only queries.
//!
//! SOLID (SRP): Orchestrates identity and credential handling only; storage
//! and fan-out are injected collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use common::{AppError, AppResult};
use domain::{
    identity, Credentials, FieldError, RegistrationInput, RegistrationResponse, UserRecord,
    CONFLICT_EMAIL, CONFLICT_USERNAME, FIELD_EMAIL, FIELD_ORDER, FIELD_USERNAME,
};

use super::context::{LoginContext, PreviewContext, RegistrationContext};
use crate::client::UserDirectory;
use crate::events::EventBroadcaster;
use crate::hashing::CredentialHasher;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Resolver trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDirectoryResolver: Send + Sync {
    /// Register a new user.
    ///
    /// Invalid input is reported through `RegistrationResponse::errors`, not
    /// as an error. Errors are reserved for infrastructure failures.
    async fn register(&self, input: RegistrationInput) -> AppResult<RegistrationResponse>;

    /// Check credentials against the stored hash.
    ///
    /// Unknown accounts and wrong passwords both yield `Ok(false)`.
    async fn login(&self, credentials: Credentials) -> AppResult<bool>;

    /// Build the record a registration would produce, without storing or
    /// publishing it
    async fn preview(&self, input: RegistrationInput) -> AppResult<UserRecord>;

    /// Greeting for the given name
    fn greet(&self, name: Option<String>) -> String;
}

/// Concrete implementation of UserDirectoryResolver.
pub struct Registrar {
    registration: RegistrationContext,
    login: LoginContext,
    preview: PreviewContext,
}

impl Registrar {
    /// Create new resolver instance
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        hasher: Arc<dyn CredentialHasher>,
        events: EventBroadcaster,
    ) -> Self {
        Self {
            registration: RegistrationContext {
                directory: directory.clone(),
                hasher: hasher.clone(),
                events,
            },
            login: LoginContext::new(directory, hasher.clone()),
            preview: PreviewContext { hasher },
        }
    }
}

#[async_trait]
impl UserDirectoryResolver for Registrar {
    async fn register(&self, input: RegistrationInput) -> AppResult<RegistrationResponse> {
        register(&self.registration, input).await
    }

    async fn login(&self, credentials: Credentials) -> AppResult<bool> {
        login(&self.login, credentials).await
    }

    async fn preview(&self, input: RegistrationInput) -> AppResult<UserRecord> {
        preview(&self.preview, input).await
    }

    fn greet(&self, name: Option<String>) -> String {
        greet(name.as_deref())
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Register flow: validate, derive, store, publish.
pub async fn register(
    ctx: &RegistrationContext,
    input: RegistrationInput,
) -> AppResult<RegistrationResponse> {
    let input = input.normalized();

    let mut errors = input.field_errors(identity::today());
    if !has_error(&errors, FIELD_USERNAME) && ctx.directory.exists(&input.username).await? {
        errors.push(taken_error(FIELD_USERNAME));
    }
    if !has_error(&errors, FIELD_EMAIL) && ctx.directory.exists(&input.email).await? {
        errors.push(taken_error(FIELD_EMAIL));
    }

    if !errors.is_empty() {
        sort_by_field(&mut errors);
        info!(
            username = %input.username,
            errors = errors.len(),
            "Registration rejected"
        );
        return Ok(RegistrationResponse::rejected(errors));
    }

    let user = assemble(&*ctx.hasher, input).await?;

    let user = match ctx.directory.insert(user).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration of the same name
        Err(AppError::Conflict(what)) if what == CONFLICT_EMAIL => {
            return Ok(RegistrationResponse::rejected(vec![taken_error(FIELD_EMAIL)]));
        }
        Err(AppError::Conflict(what)) if what == CONFLICT_USERNAME => {
            return Ok(RegistrationResponse::rejected(vec![taken_error(FIELD_USERNAME)]));
        }
        Err(e) => return Err(e),
    };

    // Registration already succeeded; a failed publish must not undo it
    match ctx.events.publish(user.clone()) {
        Ok(feeds) => debug!(user_id = %user.id, feeds, "New user published"),
        Err(e) => warn!(user_id = %user.id, error = %e, "Failed to publish new user"),
    }

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(RegistrationResponse::registered(user))
}

/// Login flow: look up the stored hash and verify against it.
pub async fn login(ctx: &LoginContext, credentials: Credentials) -> AppResult<bool> {
    let identifier = credentials.identifier.trim();

    let Some(user) = ctx.directory.find(identifier).await? else {
        // Spend the same verification work as a real account would
        let decoy = ctx.decoy_hash().await?;
        ctx.hasher.verify(&credentials.password, decoy).await?;
        debug!("Login for unknown identifier");
        return Ok(false);
    };

    let verified = ctx
        .hasher
        .verify(&credentials.password, &user.password_hash)
        .await
        .inspect_err(|e| error!(user_id = %user.id, error = %e, "Login verification failed"))?;

    debug!(user_id = %user.id, verified, "Login attempt");
    Ok(verified)
}

/// Preview flow: validate and derive without side effects.
pub async fn preview(ctx: &PreviewContext, input: RegistrationInput) -> AppResult<UserRecord> {
    let input = input.normalized();

    let errors = input.field_errors(identity::today());
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::validation(message));
    }

    assemble(&*ctx.hasher, input).await
}

/// Greeting: `Hello <name>!`, or `Hello world!` without a name.
pub fn greet(name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Hello {}!", name),
        None => "Hello world!".to_string(),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Generate the id, hash the password and build the record.
async fn assemble(hasher: &dyn CredentialHasher, input: RegistrationInput) -> AppResult<UserRecord> {
    let date_of_birth = input.parsed_date_of_birth()?;
    let id = identity::generate_id();

    let password_hash = hasher
        .hash(&input.password)
        .await
        .inspect_err(|e| error!(error = %e, "Password hashing failed"))?;

    Ok(UserRecord::new(
        id,
        input.username,
        input.email,
        password_hash,
        date_of_birth,
    ))
}

fn has_error(errors: &[FieldError], field: &str) -> bool {
    errors.iter().any(|e| e.field == field)
}

fn taken_error(field: &str) -> FieldError {
    match field {
        FIELD_EMAIL => FieldError::new(FIELD_EMAIL, "Email is already registered"),
        _ => FieldError::new(FIELD_USERNAME, "Username is already taken"),
    }
}

fn sort_by_field(errors: &mut [FieldError]) {
    errors.sort_by_key(|e| {
        FIELD_ORDER
            .iter()
            .position(|f| *f == e.field)
            .unwrap_or(FIELD_ORDER.len())
    });
}
