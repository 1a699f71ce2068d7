//! Auth service configuration.

use std::env;
use std::str::FromStr;

use tracing::warn;

use common::{AppResult, FeedConfig, HashingConfig};

/// Auth service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthServiceConfig {
    /// Password hashing cost parameters
    pub hashing: HashingConfig,
    /// Subscription feed buffering
    pub feed: FeedConfig,
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `HASH_COST` | 10 |
    /// | `HASH_MEMORY_KIB` | 19456 |
    /// | `HASH_PARALLELISM` | 1 |
    /// | `FEED_BUFFER_SIZE` | 64 |
    ///
    /// Each variable may also be given with an `AUTH_SERVICE_` prefix.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).or_else(|| lookup(&format!("AUTH_SERVICE_{}", key)));

        Self {
            hashing: HashingConfig {
                cost: parse_or(read("HASH_COST"), "HASH_COST", defaults.hashing.cost),
                memory_kib: parse_or(
                    read("HASH_MEMORY_KIB"),
                    "HASH_MEMORY_KIB",
                    defaults.hashing.memory_kib,
                ),
                parallelism: parse_or(
                    read("HASH_PARALLELISM"),
                    "HASH_PARALLELISM",
                    defaults.hashing.parallelism,
                ),
            },
            feed: FeedConfig {
                buffer_size: parse_or(
                    read("FEED_BUFFER_SIZE"),
                    "FEED_BUFFER_SIZE",
                    defaults.feed.buffer_size,
                ),
            },
        }
    }

    /// Check every section.
    pub fn validate(&self) -> AppResult<()> {
        self.hashing.validate()?;
        self.feed.validate()
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(key, %value, %default, "Ignoring unparsable setting");
            default
        }),
    }
}
