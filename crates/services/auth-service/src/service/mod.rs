//! User directory business logic.

mod context;
mod resolver;

pub use context::{LoginContext, PreviewContext, RegistrationContext};
pub use resolver::{greet, login, preview, register, Registrar, UserDirectoryResolver};

#[cfg(any(test, feature = "test-utils"))]
pub use resolver::MockUserDirectoryResolver;
