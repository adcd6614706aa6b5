//! Synthetic identity generation
//!
//! Logins and passwords are drawn from the thread-local CSPRNG, so the
//! generator keeps no counter and can be shared across threads. Uniqueness is
//! statistical: a 12 character lowercase alphanumeric login has roughly 2^62
//! possible values. Callers that want a hard guarantee within one scope use
//! [`UniqueLogins`].

use std::collections::HashSet;

use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LOWERCASE_DIGITS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Shortest login that still makes collisions within a run negligible
pub const MIN_LOGIN_LENGTH: usize = 6;

/// Character set used for a generated value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    Letters,
    #[default]
    LowercaseAlphanumeric,
    Alphanumeric,
}

impl Alphabet {
    fn chars(&self) -> &'static [u8] {
        match self {
            Alphabet::Letters => LETTERS,
            Alphabet::LowercaseAlphanumeric => LOWERCASE_DIGITS,
            Alphabet::Alphanumeric => ALPHANUMERIC,
        }
    }
}

/// Length and alphabet policy for generated credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityPolicy {
    pub login_length: usize,
    pub password_length: usize,
    pub login_alphabet: Alphabet,
    pub password_alphabet: Alphabet,
}

impl Default for IdentityPolicy {
    fn default() -> Self {
        Self {
            login_length: 12,
            password_length: 16,
            login_alphabet: Alphabet::LowercaseAlphanumeric,
            password_alphabet: Alphabet::Alphanumeric,
        }
    }
}

impl IdentityPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.login_length < MIN_LOGIN_LENGTH {
            return Err(Error::InvalidConfig(format!(
                "login_length must be at least {}, got {}",
                MIN_LOGIN_LENGTH, self.login_length
            )));
        }
        if self.password_length == 0 {
            return Err(Error::InvalidConfig(
                "password_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stateless generator of random logins and passwords
#[derive(Debug, Clone, Default)]
pub struct IdentityGenerator {
    policy: IdentityPolicy,
}

impl IdentityGenerator {
    pub fn new(policy: IdentityPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &IdentityPolicy {
        &self.policy
    }

    /// Random login. Always starts with a letter so it reads as a username.
    pub fn generate_login(&self) -> String {
        let mut rng = rand::thread_rng();
        let first_set = match self.policy.login_alphabet {
            Alphabet::LowercaseAlphanumeric => LOWERCASE,
            _ => LETTERS,
        };
        let mut login = String::with_capacity(self.policy.login_length);
        login.push(pick(&mut rng, first_set));
        login.extend(
            (1..self.policy.login_length).map(|_| pick(&mut rng, self.policy.login_alphabet.chars())),
        );
        login
    }

    pub fn generate_password(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.policy.password_length)
            .map(|_| pick(&mut rng, self.policy.password_alphabet.chars()))
            .collect()
    }
}

fn pick<R: Rng>(rng: &mut R, set: &[u8]) -> char {
    set[rng.gen_range(0..set.len())] as char
}

/// Logins handed out within one explicit scope (one registry).
///
/// A repeat draw is retried up to `max_attempts` times; past that the scope
/// reports [`Error::GenerationExhausted`] instead of handing out a login that
/// was already used.
#[derive(Debug)]
pub struct UniqueLogins {
    issued: Mutex<HashSet<String>>,
    max_attempts: usize,
}

impl Default for UniqueLogins {
    fn default() -> Self {
        Self::new(8)
    }
}

impl UniqueLogins {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            issued: Mutex::new(HashSet::new()),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Draw a login from `generator` that this scope has not issued before
    pub fn issue(&self, generator: &IdentityGenerator) -> Result<String> {
        self.issue_with(|| generator.generate_login())
    }

    pub(crate) fn issue_with<F>(&self, mut draw: F) -> Result<String>
    where
        F: FnMut() -> String,
    {
        let mut issued = self.issued.lock();
        for attempt in 1..=self.max_attempts {
            let login = draw();
            if issued.insert(login.clone()) {
                return Ok(login);
            }
            warn!("Generated login collided with an issued one (attempt {})", attempt);
        }
        Err(Error::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }

    pub fn contains(&self, login: &str) -> bool {
        self.issued.lock().contains(login)
    }

    pub fn len(&self) -> usize {
        self.issued.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_default_lengths_and_alphabets() {
        let generator = IdentityGenerator::default();
        let login = generator.generate_login();
        let password = generator.generate_password();

        assert_eq!(login.len(), 12);
        assert!(login.chars().next().unwrap().is_ascii_lowercase());
        assert!(login.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_letters_only_policy() {
        let generator = IdentityGenerator::new(IdentityPolicy {
            login_alphabet: Alphabet::Letters,
            password_alphabet: Alphabet::Letters,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(generator.policy().login_alphabet, Alphabet::Letters);
        assert_eq!(generator.policy().login_length, 12);
        assert!(generator.generate_login().chars().all(|c| c.is_ascii_alphabetic()));
        assert!(generator.generate_password().chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn test_policy_rejects_short_logins() {
        let err = IdentityGenerator::new(IdentityPolicy {
            login_length: 3,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = IdentityPolicy {
            password_length: 0,
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_logins_distinct_across_threads() {
        let generator = Arc::new(IdentityGenerator::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || {
                    (0..250).map(|_| generator.generate_login()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for login in handle.join().unwrap() {
                assert!(all.insert(login), "duplicate login across threads");
            }
        }
        assert_eq!(all.len(), 2000);
    }

    #[test]
    fn test_unique_logins_retries_then_succeeds() {
        let scope = UniqueLogins::new(3);
        assert!(scope.is_empty());
        let mut draws = vec!["taken", "taken", "fresh"].into_iter();
        scope.issue_with(|| "taken".to_string()).unwrap();

        let login = scope
            .issue_with(|| draws.next().unwrap().to_string())
            .unwrap();
        assert_eq!(login, "fresh");
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn test_unique_logins_exhaustion_fails_loudly() {
        let scope = UniqueLogins::new(4);
        scope.issue_with(|| "same".to_string()).unwrap();

        let err = scope.issue_with(|| "same".to_string()).unwrap_err();
        assert!(matches!(err, Error::GenerationExhausted { attempts: 4 }));
        assert!(scope.contains("same"));
        assert_eq!(scope.len(), 1);
    }
}
