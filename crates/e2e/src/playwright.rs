//! Playwright browser automation for the login form

use std::path::PathBuf;
use std::process::{Command, Stdio};

use async_trait::async_trait;
use loginprobe_common::{Outcome, UserRecord};
use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::config::SelectorConfig;
use crate::error::{E2eError, E2eResult};

/// What the login page showed after the form was submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "observed", rename_all = "snake_case")]
pub enum ObservedOutcome {
    /// The dashboard heading became visible
    Authenticated { heading: String },
    /// The error notification became visible
    Notification { text: String },
}

impl ObservedOutcome {
    /// Outcome kind this observation stands for, if it is a known one
    pub fn classify(&self) -> Option<Outcome> {
        match self {
            ObservedOutcome::Authenticated { heading } => {
                Outcome::is_dashboard_heading(heading).then_some(Outcome::Authenticated)
            }
            ObservedOutcome::Notification { text } => Outcome::classify_notification(text),
        }
    }
}

impl std::fmt::Display for ObservedOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservedOutcome::Authenticated { heading } => write!(f, "heading '{}'", heading),
            ObservedOutcome::Notification { text } => write!(f, "notification '{}'", text),
        }
    }
}

/// Submits credentials through the login UI and reports what it shows
#[async_trait]
pub trait LoginDriver: Send + Sync {
    async fn attempt_login(&self, credentials: &UserRecord) -> E2eResult<ObservedOutcome>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

/// A single browser action in a login attempt
#[derive(Debug, Clone)]
enum FormStep {
    Navigate { url: String },
    Fill { selector: String, value: String },
    Click { selector: String },
    AwaitOutcome { timeout_ms: u64 },
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(mut config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        std::fs::create_dir_all(&config.screenshot_dir)?;
        // Scripts run from a temp dir, so screenshot paths must be absolute
        config.screenshot_dir = std::fs::canonicalize(&config.screenshot_dir)?;
        Ok(Self { config })
    }

    /// Check if Playwright is installed
    pub fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    fn steps_for(&self, credentials: &UserRecord) -> Vec<FormStep> {
        let selectors = &self.config.selectors;
        let within_form = |selector: &str| format!("{} {}", selectors.form, selector);

        vec![
            FormStep::Navigate { url: "/".to_string() },
            FormStep::Fill {
                selector: within_form(&selectors.login_input),
                value: credentials.login().to_string(),
            },
            FormStep::Fill {
                selector: within_form(&selectors.password_input),
                value: credentials.password().to_string(),
            },
            FormStep::Click {
                selector: within_form(&selectors.submit_button),
            },
            FormStep::AwaitOutcome {
                timeout_ms: self.config.outcome_timeout_ms,
            },
        ]
    }

    /// Build the Playwright script for one login attempt
    pub fn build_script(&self, credentials: &UserRecord) -> String {
        let mut script = String::new();

        script.push_str(&format!(
            r#"
const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const baseUrl = {base_url};

  try {{
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            base_url = js_str(self.config.base_url.trim_end_matches('/')),
        ));

        for (i, step) in self.steps_for(credentials).iter().enumerate() {
            script.push_str(&format!("\n    // Step {}\n", i + 1));
            script.push_str(&self.step_to_js(step));
            script.push('\n');
        }

        script.push_str(
            r#"
  } catch (error) {
    console.log(JSON.stringify({ success: false, error: error.message }));
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        script
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, step: &FormStep) -> String {
        match step {
            FormStep::Navigate { url } => {
                format!("    await page.goto(baseUrl + {});", js_str(url))
            }
            FormStep::Fill { selector, value } => {
                format!("    await page.fill({}, {});", js_str(selector), js_str(value))
            }
            FormStep::Click { selector } => {
                format!("    await page.click({});", js_str(selector))
            }
            FormStep::AwaitOutcome { timeout_ms } => {
                let failure_shot = self.config.screenshot_dir.join("last-failure.png");
                format!(
                    r#"    const heading = page.locator({heading}).first();
    const notification = page.locator({notification}).first();
    let observed;
    try {{
      observed = await Promise.any([
        heading.waitFor({{ state: 'visible', timeout: {timeout} }})
          .then(async () => ({{ observed: 'authenticated', heading: await heading.innerText() }})),
        notification.waitFor({{ state: 'visible', timeout: {timeout} }})
          .then(async () => ({{ observed: 'notification', text: await notification.innerText() }})),
      ]);
    }} catch (e) {{
      await page.screenshot({{ path: {shot}, fullPage: true }});
      throw new Error('neither dashboard nor notification appeared within {timeout} ms');
    }}
    console.log(JSON.stringify({{ success: true, ...observed }}));"#,
                    heading = js_str(&self.config.selectors.success_heading),
                    notification = js_str(&self.config.selectors.error_notification),
                    timeout = timeout_ms,
                    shot = js_str(&failure_shot.to_string_lossy()),
                )
            }
        }
    }

    /// Execute a script via node and return its stdout
    pub async fn run_script(&self, script: &str) -> E2eResult<String> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("login.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(E2eError::Playwright(format!(
                "Script failed:\nstderr: {}",
                stderr
            )));
        }

        Ok(stdout)
    }
}

#[async_trait]
impl LoginDriver for PlaywrightHandle {
    async fn attempt_login(&self, credentials: &UserRecord) -> E2eResult<ObservedOutcome> {
        let script = self.build_script(credentials);
        let stdout = self.run_script(&script).await?;
        parse_report(&stdout)
    }
}

/// Parse the JSON report a login script prints as its last line
fn parse_report(stdout: &str) -> E2eResult<ObservedOutcome> {
    let line = stdout
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .ok_or_else(|| E2eError::Playwright(format!("No report in output: {}", stdout)))?;

    let report: serde_json::Value = serde_json::from_str(line)?;
    if report["success"] != serde_json::Value::Bool(true) {
        let reason = report["error"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        return Err(if reason.contains("neither dashboard nor notification") {
            E2eError::Timeout(reason)
        } else {
            E2eError::Playwright(reason)
        });
    }

    serde_json::from_value(report)
        .map_err(|e| E2eError::Playwright(format!("Malformed report {}: {}", line, e)))
}

/// Quote a value as a JavaScript string literal
fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
    pub outcome_timeout_ms: u64,
    pub selectors: SelectorConfig,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: loginprobe_common::backend::DEFAULT_BASE_URL.to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            outcome_timeout_ms: 15_000,
            selectors: SelectorConfig::default(),
        }
    }
}
