//! Shared configuration structures.

use serde::{Deserialize, Serialize};

use domain::{
    DEFAULT_FEED_BUFFER_SIZE, DEFAULT_HASH_COST, DEFAULT_HASH_MEMORY_KIB,
    DEFAULT_HASH_PARALLELISM,
};

use crate::error::{AppError, AppResult};

/// Password hashing cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct HashingConfig {
    /// Cost factor (iteration count); higher is slower
    pub cost: u32,
    /// Memory per hash in KiB
    pub memory_kib: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            cost: DEFAULT_HASH_COST,
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            parallelism: DEFAULT_HASH_PARALLELISM,
        }
    }
}

impl HashingConfig {
    /// Config with a custom cost and default memory/parallelism
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost,
            ..Self::default()
        }
    }

    /// Reject parameter combinations the hashing engine cannot run
    pub fn validate(&self) -> AppResult<()> {
        if self.cost == 0 {
            return Err(AppError::config("hash cost must be at least 1"));
        }
        if self.parallelism == 0 {
            return Err(AppError::config("hash parallelism must be at least 1"));
        }
        if self.memory_kib < 8 * self.parallelism {
            return Err(AppError::config(format!(
                "hash memory must be at least {} KiB for parallelism {}",
                8 * self.parallelism,
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// Subscription feed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Events buffered per feed before the oldest are dropped
    pub buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_FEED_BUFFER_SIZE,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.buffer_size == 0 {
            return Err(AppError::config("feed buffer size must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let hashing = HashingConfig::default();
        assert_eq!(hashing.cost, 10);
        assert!(hashing.validate().is_ok());

        let feed = FeedConfig::default();
        assert_eq!(feed.buffer_size, 64);
        assert!(feed.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(HashingConfig::with_cost(0).validate().is_err());
        assert!(FeedConfig { buffer_size: 0 }.validate().is_err());

        let starved = HashingConfig {
            memory_kib: 4,
            ..HashingConfig::default()
        };
        assert!(starved.validate().is_err());
    }
}
