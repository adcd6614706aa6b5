//! Core types for LoginProbe

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Backend-side registration state of a user.
///
/// A user that was never registered has no status at all; see
/// [`crate::outcome::Precondition::NotRegistered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
}

impl UserStatus {
    pub const ALL: [UserStatus; 2] = [UserStatus::Active, UserStatus::Blocked];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "blocked" => Ok(UserStatus::Blocked),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

/// A synthetic credential set: login, password and the status it is (or
/// would be) registered with.
///
/// Records are immutable. Substitution scenarios build a new record through
/// [`UserRecord::with_login`] or [`UserRecord::with_password`].
///
/// The serialized form is the registration payload the application's
/// test endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    login: String,
    password: String,
    status: UserStatus,
}

impl UserRecord {
    pub fn new(login: impl Into<String>, password: impl Into<String>, status: UserStatus) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            status,
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// Copy of this record with a different login
    pub fn with_login(&self, login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            ..self.clone()
        }
    }

    /// Copy of this record with a different password
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("active".parse::<UserStatus>().unwrap(), UserStatus::Active);
        assert_eq!(" Blocked ".parse::<UserStatus>().unwrap(), UserStatus::Blocked);
        assert!(matches!(
            "deleted".parse::<UserStatus>(),
            Err(Error::InvalidStatus(s)) if s == "deleted"
        ));
    }

    #[test]
    fn test_record_serializes_as_registration_payload() {
        let record = UserRecord::new("petya", "s3cret", UserStatus::Blocked);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "login": "petya", "password": "s3cret", "status": "blocked" })
        );
    }

    #[test]
    fn test_substitution_leaves_original_untouched() {
        let record = UserRecord::new("petya", "s3cret", UserStatus::Active);
        let wrong_login = record.with_login("masha");
        let wrong_password = record.with_password("other");

        assert_eq!(record.login(), "petya");
        assert_eq!(record.password(), "s3cret");
        assert_eq!(wrong_login.login(), "masha");
        assert_eq!(wrong_login.password(), "s3cret");
        assert_eq!(wrong_password.login(), "petya");
        assert_eq!(wrong_password.password(), "other");
        assert_eq!(wrong_password.status(), UserStatus::Active);
    }
}
