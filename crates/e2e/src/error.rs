//! Error types for E2E testing

use loginprobe_common::Outcome;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Application failed to start: {0}")]
    AppStartup(String),

    #[error("Application health check failed after {0} attempts")]
    AppHealthCheck(usize),

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Scenario spec parse error: {0}")]
    SpecParse(String),

    #[error("Fixture setup failed: {0}")]
    Fixture(#[from] loginprobe_common::Error),

    #[error("Outcome mismatch: expected {expected}, observed {observed}")]
    OutcomeMismatch { expected: Outcome, observed: String },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
