//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! All types here are shared between the directory and resolver services.

pub mod constants;
pub mod error;
pub mod identity;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use user::{
    Credentials, FieldError, RegistrationInput, RegistrationResponse, UserRecord, UserView,
};
