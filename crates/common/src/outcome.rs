//! Mapping from fixture state to the UI outcome a login attempt must produce
//!
//! | Precondition            | Submitted                  | Outcome              |
//! |-------------------------|----------------------------|----------------------|
//! | registered, active      | own login + password       | `Authenticated`      |
//! | registered, blocked     | own login + password       | `UserBlocked`        |
//! | not registered          | own login + password       | `InvalidCredentials` |
//! | registered, any status  | fresh login or password    | `InvalidCredentials` |

use serde::{Deserialize, Serialize};

use crate::types::UserStatus;

/// Heading shown once the user reaches the authenticated area
pub const DASHBOARD_HEADING: &str = "Личный кабинет";

/// Notification for unknown login or mismatched password
pub const INVALID_CREDENTIALS_TEXT: &str = "Ошибка! Неверно указан логин или пароль";

/// Notification for a registered user whose status is blocked
pub const USER_BLOCKED_TEXT: &str = "Ошибка! Пользователь заблокирован";

/// UI-observable result class of an authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Authenticated,
    InvalidCredentials,
    UserBlocked,
}

impl Outcome {
    /// Error notification text, or `None` for a successful login
    pub fn notification_text(&self) -> Option<&'static str> {
        match self {
            Outcome::Authenticated => None,
            Outcome::InvalidCredentials => Some(INVALID_CREDENTIALS_TEXT),
            Outcome::UserBlocked => Some(USER_BLOCKED_TEXT),
        }
    }

    /// Classify the text of an error notification.
    ///
    /// Whitespace is normalized before an exact comparison; any other text
    /// is not a known outcome.
    pub fn classify_notification(text: &str) -> Option<Outcome> {
        let text = normalize_whitespace(text);
        [Outcome::InvalidCredentials, Outcome::UserBlocked]
            .into_iter()
            .find(|o| o.notification_text() == Some(text.as_str()))
    }

    /// Whether a dashboard heading with this text means a successful login
    pub fn is_dashboard_heading(text: &str) -> bool {
        normalize_whitespace(text) == DASHBOARD_HEADING
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Authenticated => write!(f, "authenticated"),
            Outcome::InvalidCredentials => write!(f, "invalid login or password"),
            Outcome::UserBlocked => write!(f, "user is blocked"),
        }
    }
}

/// Backend state of the fixture before the UI is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    /// The record was registered with this status
    Registered(UserStatus),
    /// The record was built with this status but never registered
    NotRegistered(UserStatus),
}

impl Precondition {
    pub fn status(&self) -> UserStatus {
        match self {
            Precondition::Registered(s) | Precondition::NotRegistered(s) => *s,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Precondition::Registered(_))
    }
}

/// Which submitted field, if any, is replaced by a fresh random value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Substitution {
    #[default]
    None,
    Login,
    Password,
}

/// Outcome the application must show for a scenario
pub fn expected_outcome(precondition: Precondition, substitution: Substitution) -> Outcome {
    match (precondition, substitution) {
        (Precondition::Registered(UserStatus::Active), Substitution::None) => Outcome::Authenticated,
        (Precondition::Registered(UserStatus::Blocked), Substitution::None) => Outcome::UserBlocked,
        (Precondition::NotRegistered(_), _) => Outcome::InvalidCredentials,
        (Precondition::Registered(_), Substitution::Login | Substitution::Password) => {
            Outcome::InvalidCredentials
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Precondition::Registered(UserStatus::Active), Substitution::None => Outcome::Authenticated ; "active user with own credentials")]
    #[test_case(Precondition::Registered(UserStatus::Blocked), Substitution::None => Outcome::UserBlocked ; "blocked user with own credentials")]
    #[test_case(Precondition::NotRegistered(UserStatus::Active), Substitution::None => Outcome::InvalidCredentials ; "unregistered user")]
    #[test_case(Precondition::Registered(UserStatus::Active), Substitution::Login => Outcome::InvalidCredentials ; "wrong login")]
    #[test_case(Precondition::Registered(UserStatus::Active), Substitution::Password => Outcome::InvalidCredentials ; "wrong password")]
    #[test_case(Precondition::Registered(UserStatus::Blocked), Substitution::Password => Outcome::InvalidCredentials ; "blocked user with wrong password")]
    #[test_case(Precondition::NotRegistered(UserStatus::Blocked), Substitution::Login => Outcome::InvalidCredentials ; "unregistered user with wrong login")]
    fn outcome_table(precondition: Precondition, substitution: Substitution) -> Outcome {
        expected_outcome(precondition, substitution)
    }

    #[test_case(INVALID_CREDENTIALS_TEXT => Some(Outcome::InvalidCredentials) ; "invalid credentials")]
    #[test_case("  Ошибка!\n Пользователь   заблокирован " => Some(Outcome::UserBlocked) ; "blocked with extra whitespace")]
    #[test_case("Ошибка! Что-то пошло не так" => None ; "unknown text")]
    #[test_case("" => None ; "empty")]
    fn classify(text: &str) -> Option<Outcome> {
        Outcome::classify_notification(text)
    }

    #[test]
    fn test_success_has_no_notification() {
        assert_eq!(Outcome::Authenticated.notification_text(), None);
        assert!(Outcome::is_dashboard_heading("  Личный кабинет\n"));
        assert!(!Outcome::is_dashboard_heading("Интернет Банк"));
    }

    #[test]
    fn test_precondition_serde_shape() {
        let json = serde_json::to_value(Precondition::Registered(UserStatus::Blocked)).unwrap();
        assert_eq!(json, serde_json::json!({ "registered": "blocked" }));
        assert!(!Precondition::NotRegistered(UserStatus::Active).is_registered());
        assert_eq!(Precondition::NotRegistered(UserStatus::Blocked).status(), UserStatus::Blocked);
    }
}
