//! Clients for collaborating services.

mod user_client;

pub use user_client::{UserClient, UserDirectory};

#[cfg(any(test, feature = "test-utils"))]
pub use user_client::MockUserDirectory;
