//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use loginprobe_common::backend::{DEFAULT_BASE_URL, DEFAULT_REGISTRATION_PATH};
use loginprobe_common::{BackendConfig, IdentityPolicy};

use crate::error::{E2eError, E2eResult};
use crate::playwright::{Browser, PlaywrightConfig};
use crate::server::AppConfig;

/// Harness configuration, usually read from `loginprobe.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Address of the application under test
    pub base_url: String,

    /// Directory with YAML scenario specs (None = built-in scenarios)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs_dir: Option<PathBuf>,

    /// Output directory for results
    pub output_dir: PathBuf,

    /// Out-of-band registration endpoint
    pub registration: RegistrationSettings,

    /// Application process management
    pub app: AppSettings,

    /// Browser settings
    pub browser: BrowserSettings,

    /// Login form selectors
    pub selectors: SelectorConfig,

    /// Generated credential policy
    pub identity: IdentityPolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            specs_dir: None,
            output_dir: PathBuf::from("test-results"),
            registration: RegistrationSettings::default(),
            app: AppSettings::default(),
            browser: BrowserSettings::default(),
            selectors: SelectorConfig::default(),
            identity: IdentityPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationSettings {
    pub path: String,
    pub timeout_secs: u64,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_REGISTRATION_PATH.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Command that starts the application. Empty = attach to a running one.
    pub command: Vec<String>,

    /// Working directory for the command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Path polled until the application answers
    pub health_path: String,

    pub startup_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            working_dir: None,
            health_path: "/".to_string(),
            startup_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub kind: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// How long to wait for the dashboard or a notification after submit
    pub outcome_timeout_ms: u64,
    pub screenshot_dir: PathBuf,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            kind: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            outcome_timeout_ms: 15_000,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
        }
    }
}

/// CSS selectors of the login page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub form: String,
    pub login_input: String,
    pub password_input: String,
    pub submit_button: String,
    pub success_heading: String,
    pub error_notification: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            form: "form".to_string(),
            login_input: "[data-test-id=login] input".to_string(),
            password_input: "[data-test-id=password] input".to_string(),
            submit_button: ".button_theme_alfa-on-white".to_string(),
            success_heading: ".heading_theme_alfa-on-white".to_string(),
            error_notification: "[data-test-id=error-notification] .notification__content"
                .to_string(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults if it is missing
    pub fn load(path: &Path) -> E2eResult<Self> {
        let config = if path.exists() {
            Self::read(path)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file that must exist
    pub fn load_required(path: &Path) -> E2eResult<Self> {
        if !path.is_file() {
            return Err(E2eError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file. Relative paths in it are taken from the file's
    /// directory, and the app command runs there unless `working_dir` says
    /// otherwise.
    fn read(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };

        self.specs_dir = self.specs_dir.as_deref().map(resolve);
        self.output_dir = resolve(&self.output_dir);
        self.browser.screenshot_dir = resolve(&self.browser.screenshot_dir);
        self.app.working_dir = Some(match &self.app.working_dir {
            Some(dir) => resolve(dir),
            None => base.to_path_buf(),
        });
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> E2eResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| E2eError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.browser.outcome_timeout_ms == 0 {
            return Err(E2eError::Config(
                "browser.outcome_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.identity.validate()?;
        Ok(())
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            registration_path: self.registration.path.clone(),
            request_timeout: Duration::from_secs(self.registration.timeout_secs),
        }
    }

    pub fn playwright_config(&self) -> PlaywrightConfig {
        PlaywrightConfig {
            base_url: self.base_url.clone(),
            screenshot_dir: self.browser.screenshot_dir.clone(),
            viewport_width: self.browser.viewport_width,
            viewport_height: self.browser.viewport_height,
            browser: self.browser.kind,
            headless: self.browser.headless,
            outcome_timeout_ms: self.browser.outcome_timeout_ms,
            selectors: self.selectors.clone(),
        }
    }

    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            command: self.app.command.clone(),
            working_dir: self.app.working_dir.clone(),
            base_url: self.base_url.clone(),
            health_path: self.app.health_path.clone(),
            startup_timeout: Duration::from_secs(self.app.startup_timeout_secs),
        }
    }
}
