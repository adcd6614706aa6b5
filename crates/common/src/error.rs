//! Error types for LoginProbe fixtures

use thiserror::Error;

use crate::types::UserStatus;

/// Result type alias using LoginProbe Error
pub type Result<T> = std::result::Result<T, Error>;

/// LoginProbe fixture error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Registration of '{login}' as {status} failed: {reason}")]
    Registration {
        login: String,
        status: UserStatus,
        reason: String,
    },

    #[error("Could not generate a fresh login after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    #[error("Invalid user status: {0}")]
    InvalidStatus(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether this error means a fixture could not be put into place
    /// before a scenario ran.
    pub fn is_fixture_failure(&self) -> bool {
        matches!(
            self,
            Error::Registration { .. } | Error::GenerationExhausted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_error_names_login_and_status() {
        let err = Error::Registration {
            login: "vasya".to_string(),
            status: UserStatus::Blocked,
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Registration of 'vasya' as blocked failed: HTTP 500"
        );
        assert!(err.is_fixture_failure());
    }

    #[test]
    fn config_errors_are_not_fixture_failures() {
        assert!(!Error::InvalidConfig("bad".into()).is_fixture_failure());
        assert!(Error::GenerationExhausted { attempts: 3 }.is_fixture_failure());
    }
}
