//! Password hashing and verification.

mod credential_hasher;

pub use credential_hasher::{Argon2Hasher, CredentialHasher};

#[cfg(any(test, feature = "test-utils"))]
pub use credential_hasher::MockCredentialHasher;
