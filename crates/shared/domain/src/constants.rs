//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Field name reported for username violations
pub const FIELD_USERNAME: &str = "username";

/// Field name reported for email violations
pub const FIELD_EMAIL: &str = "email";

/// Field name reported for password violations
pub const FIELD_PASSWORD: &str = "password";

/// Field name reported for date of birth violations
pub const FIELD_DOB: &str = "dob";

/// Order in which field errors are reported
pub const FIELD_ORDER: &[&str] = &[FIELD_USERNAME, FIELD_EMAIL, FIELD_PASSWORD, FIELD_DOB];

// =============================================================================
// Directory conflicts
// =============================================================================

/// Conflict entity reported when a user id is already stored
pub const CONFLICT_USER: &str = "User";

/// Conflict entity reported when a username is already stored
pub const CONFLICT_USERNAME: &str = "Username";

/// Conflict entity reported when an email is already stored
pub const CONFLICT_EMAIL: &str = "Email";

// =============================================================================
// Credential hashing
// =============================================================================

/// Default hashing cost (Argon2 iteration count)
pub const DEFAULT_HASH_COST: u32 = 10;

/// Default hashing memory in KiB (Argon2 recommended minimum)
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19 * 1024;

/// Default hashing parallelism (lanes)
pub const DEFAULT_HASH_PARALLELISM: u32 = 1;

/// Highest cost a stored hash may carry and still be verified
pub const MAX_STORED_HASH_COST: u32 = 64;

/// Highest memory (KiB) a stored hash may carry and still be verified
pub const MAX_STORED_HASH_MEMORY_KIB: u32 = 256 * 1024;

/// Highest parallelism a stored hash may carry and still be verified
pub const MAX_STORED_HASH_PARALLELISM: u32 = 16;

// =============================================================================
// Subscriptions
// =============================================================================

/// Default number of events buffered per subscription feed.
///
/// A feed that falls further behind than this loses its oldest events.
pub const DEFAULT_FEED_BUFFER_SIZE: usize = 64;

/// Topic name for user registration events
pub const TOPIC_NEW_USER: &str = "NEW_USER";
