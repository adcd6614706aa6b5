//! LoginProbe Common Library
//!
//! Test fixtures for login regression scenarios: synthetic identities, their
//! registration lifecycle in the application under test, and the contract
//! between fixture state and the UI outcome a scenario must observe.

pub mod backend;
pub mod error;
pub mod identity;
pub mod outcome;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendConfig, HttpRegistrationBackend, RegistrationBackend};
pub use error::{Error, Result};
pub use identity::{Alphabet, IdentityGenerator, IdentityPolicy, UniqueLogins};
pub use outcome::{expected_outcome, Outcome, Precondition, Substitution};
pub use registry::UserRegistry;
pub use types::*;

/// LoginProbe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
