//! Credential hashing - salted, cost-tunable password hashes.
//!
//! Hashes are Argon2id PHC strings, so algorithm, cost and salt travel with
//! the hash and verification needs nothing but the stored string.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use common::{AppError, AppResult, HashingConfig};
use domain::{
    DomainError, DomainResult, MAX_STORED_HASH_COST, MAX_STORED_HASH_MEMORY_KIB,
    MAX_STORED_HASH_PARALLELISM,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Password hashing trait for dependency injection.
///
/// Both operations are CPU-bound; implementations must not block
/// the async executor while they run.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Hash a raw password with a fresh random salt
    async fn hash(&self, password: &str) -> AppResult<String>;

    /// Check a raw password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch and `MalformedHash` if `stored_hash`
    /// cannot be decoded.
    async fn verify(&self, password: &str, stored_hash: &str) -> AppResult<bool>;
}

/// Argon2id implementation of CredentialHasher.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    ceiling: HashingConfig,
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("cost", &self.params.t_cost())
            .field("memory_kib", &self.params.m_cost())
            .field("parallelism", &self.params.p_cost())
            .finish()
    }
}

impl Argon2Hasher {
    /// Create a hasher from cost parameters.
    ///
    /// # Errors
    /// Returns a config error if the parameters are out of range.
    pub fn new(config: HashingConfig) -> AppResult<Self> {
        config.validate()?;
        let params = Params::new(config.memory_kib, config.cost, config.parallelism, None)
            .map_err(|e| AppError::config(format!("invalid hashing parameters: {}", e)))?;

        // Hashes this instance writes must always stay verifiable
        let ceiling = HashingConfig {
            cost: config.cost.max(MAX_STORED_HASH_COST),
            memory_kib: config.memory_kib.max(MAX_STORED_HASH_MEMORY_KIB),
            parallelism: config.parallelism.max(MAX_STORED_HASH_PARALLELISM),
        };
        Ok(Self { params, ceiling })
    }

    /// Cost factor (iteration count) applied to new hashes
    pub fn cost(&self) -> u32 {
        self.params.t_cost()
    }

    /// Hash on the current thread.
    pub fn hash_blocking(&self, password: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2(self.params.clone())
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::hashing(format!("password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify on the current thread.
    ///
    /// The parameters embedded in `stored_hash` are used, not this hasher's,
    /// so hashes created under an older cost keep verifying. Parameters above
    /// the verification ceiling are rejected as malformed before any work.
    pub fn verify_blocking(&self, password: &str, stored_hash: &str) -> DomainResult<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| DomainError::malformed_hash(format!("invalid hash format: {}", e)))?;
        if parsed.hash.is_none() {
            return Err(DomainError::malformed_hash("hash has no output segment"));
        }

        let stored = Params::try_from(&parsed)
            .map_err(|e| DomainError::malformed_hash(format!("invalid hash parameters: {}", e)))?;
        if stored.t_cost() > self.ceiling.cost
            || stored.m_cost() > self.ceiling.memory_kib
            || stored.p_cost() > self.ceiling.parallelism
        {
            return Err(DomainError::malformed_hash(format!(
                "hash parameters m={},t={},p={} exceed the verification ceiling",
                stored.m_cost(),
                stored.t_cost(),
                stored.p_cost()
            )));
        }

        // Output comparison inside verify_password is constant-time
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(DomainError::malformed_hash(format!(
                "unusable hash parameters: {}",
                e
            ))),
        }
    }

    #[inline]
    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

#[async_trait]
impl CredentialHasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> AppResult<String> {
        let hasher = self.clone();
        let password = password.to_owned();

        let hash = tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| AppError::hashing(format!("hashing task failed: {}", e)))??;

        debug!(cost = self.cost(), "Password hashed");
        Ok(hash)
    }

    async fn verify(&self, password: &str, stored_hash: &str) -> AppResult<bool> {
        let hasher = self.clone();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        let verified =
            tokio::task::spawn_blocking(move || hasher.verify_blocking(&password, &stored_hash))
                .await
                .map_err(|e| AppError::internal(format!("verification task failed: {}", e)))?;

        if let Err(DomainError::MalformedHash(reason)) = &verified {
            warn!(%reason, "Stored password hash could not be decoded");
        }
        Ok(verified?)
    }
}
