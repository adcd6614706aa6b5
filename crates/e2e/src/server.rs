//! Application under test - spawning (optionally) and health checking

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to the application under test.
///
/// Owns the process when the harness started it; otherwise it only records
/// that a running instance answered the health check.
pub struct AppHandle {
    child: Option<Child>,
    pub base_url: String,
}

impl AppHandle {
    /// Start the application if a command is configured, then wait until
    /// it answers on its base URL
    pub async fn start(config: AppConfig) -> E2eResult<Self> {
        let child = match config.command.split_first() {
            Some((program, args)) => {
                info!("Starting application: {}", config.command.join(" "));

                let mut cmd = Command::new(program);
                cmd.args(args).stdout(Stdio::null()).stderr(Stdio::inherit());
                if let Some(dir) = &config.working_dir {
                    cmd.current_dir(dir);
                }

                let child = cmd.spawn().map_err(|e| {
                    E2eError::AppStartup(format!("Failed to spawn {}: {}", program, e))
                })?;
                Some(child)
            }
            None => {
                info!("Attaching to running application at {}", config.base_url);
                None
            }
        };

        let handle = AppHandle {
            child,
            base_url: config.base_url.clone(),
        };

        handle
            .wait_for_healthy(&config.health_url(), config.startup_timeout)
            .await?;

        info!("Application is up at {}", handle.base_url);
        Ok(handle)
    }

    /// Poll until the application responds
    async fn wait_for_healthy(&self, health_url: &str, timeout_duration: Duration) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for application to start...");
                    }
                    // Connection refused is expected while the app is starting
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(250)).await;
        }

        Err(E2eError::AppHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the harness owns the application process
    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }

    /// Stop the application if the harness started it: SIGTERM, a short
    /// grace period, then kill
    pub async fn shutdown(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping application (pid: {})", child.id());

        if terminate(&child) {
            let deadline = std::time::Instant::now() + SHUTDOWN_GRACE;
            while std::time::Instant::now() < deadline {
                if child.try_wait()?.is_some() {
                    return Ok(());
                }
                sleep(Duration::from_millis(50)).await;
            }
        }

        // Force kill if still running
        let _ = child.kill();
        child.wait()?;
        Ok(())
    }
}

/// Time a managed application gets to exit after SIGTERM
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Ask the process to exit; false if the signal could not be sent
fn terminate(child: &Child) -> bool {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM).is_ok()
    }
    #[cfg(not(unix))]
    {
        let _ = child;
        false
    }
}

impl Drop for AppHandle {
    fn drop(&mut self) {
        // No grace period here: drop may run on a runtime worker
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// How to reach (and optionally start) the application under test
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Program and arguments; empty = attach to an already running instance
    pub command: Vec<String>,

    pub working_dir: Option<PathBuf>,

    pub base_url: String,

    /// Path requested during health checks
    pub health_path: String,

    /// Timeout for startup
    pub startup_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            working_dir: None,
            base_url: loginprobe_common::backend::DEFAULT_BASE_URL.to_string(),
            health_path: "/".to_string(),
            startup_timeout: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    pub fn health_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.health_path.trim_start_matches('/')
        )
    }
}
