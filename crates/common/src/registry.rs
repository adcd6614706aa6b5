//! User fixture registry
//!
//! Builds [`UserRecord`]s from freshly generated credentials and, on request,
//! registers them with the application before a scenario touches the UI.
//! Nothing is cached: every call yields a new login, and there is no
//! deregistration step.

use tracing::info;

use crate::backend::RegistrationBackend;
use crate::error::Result;
use crate::identity::{IdentityGenerator, UniqueLogins};
use crate::types::{UserRecord, UserStatus};

pub struct UserRegistry<B> {
    generator: IdentityGenerator,
    logins: UniqueLogins,
    backend: B,
}

impl<B: RegistrationBackend> UserRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self::with_generator(IdentityGenerator::default(), backend)
    }

    pub fn with_generator(generator: IdentityGenerator, backend: B) -> Self {
        Self {
            generator,
            logins: UniqueLogins::default(),
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build a record with the given status. It is not registered.
    pub fn create_user(&self, status: UserStatus) -> Result<UserRecord> {
        let login = self.logins.issue(&self.generator)?;
        Ok(UserRecord::new(
            login,
            self.generator.generate_password(),
            status,
        ))
    }

    /// Build a record and register it through the backend.
    ///
    /// The record is returned only after the backend confirmed the
    /// registration; any failure is propagated as is, without retry.
    pub async fn create_registered_user(&self, status: UserStatus) -> Result<UserRecord> {
        let record = self.create_user(status)?;
        self.backend.register_user(&record).await?;
        info!("Registered user {} ({})", record.login(), status);
        Ok(record)
    }

    /// A login never handed out by this registry, for wrong-login attempts
    pub fn fresh_login(&self) -> Result<String> {
        self.logins.issue(&self.generator)
    }

    /// A password for wrong-password attempts, guaranteed to differ from `current`
    pub fn fresh_password(&self, current: &str) -> String {
        loop {
            let password = self.generator.generate_password();
            if password != current {
                return password;
            }
        }
    }
}
