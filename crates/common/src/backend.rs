//! Out-of-band user registration against the application under test

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::UserRecord;

/// Default address of the application under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:9999";

/// Test-mode endpoint that creates users directly in the data layer
pub const DEFAULT_REGISTRATION_PATH: &str = "/api/system/users";

/// Something that can make a [`UserRecord`] known to the application
/// without going through the UI.
#[async_trait]
pub trait RegistrationBackend: Send + Sync {
    /// Register `record` with its login, password and status.
    ///
    /// Returns only once the application has confirmed the registration.
    async fn register_user(&self, record: &UserRecord) -> Result<()>;
}

/// Registration over the application's HTTP test endpoint
#[derive(Debug, Clone)]
pub struct HttpRegistrationBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRegistrationBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RegistrationBackend for HttpRegistrationBackend {
    async fn register_user(&self, record: &UserRecord) -> Result<()> {
        debug!("POST {} for {}", self.endpoint, record.login());

        let failure = |reason: String| Error::Registration {
            login: record.login().to_string(),
            status: record.status(),
            reason,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(record)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(failure(format!("HTTP {}: {}", status, body.trim())))
            }
        }
    }
}

/// Where and how to reach the registration endpoint
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub registration_path: String,
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            registration_path: DEFAULT_REGISTRATION_PATH.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl BackendConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.registration_path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let config = BackendConfig {
            base_url: "http://localhost:9999/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:9999/api/system/users");

        let config = BackendConfig {
            registration_path: "api/system/users".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:9999/api/system/users");
    }
}
