//! Scenario runner: prepares fixtures, drives the login form and checks the
//! observed outcome against the outcome contract

use std::path::PathBuf;
use std::time::Instant;

use loginprobe_common::{
    HttpRegistrationBackend, IdentityGenerator, Outcome, Precondition, RegistrationBackend,
    Substitution, UserRecord, UserRegistry,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::HarnessConfig;
use crate::error::{E2eError, E2eResult};
use crate::playwright::{LoginDriver, ObservedOutcome, PlaywrightHandle};
use crate::server::AppHandle;
use crate::spec::ScenarioSpec;

/// Stage at which a scenario failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePhase {
    /// The fixture could not be built or registered; the UI was never touched
    Fixture,
    /// The browser could not complete the attempt
    Browser,
    /// The UI showed something other than the expected outcome
    Outcome,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub precondition: Precondition,
    pub substitute: Substitution,
    pub expected: Outcome,
    /// Login submitted through the form (passwords are never reported)
    pub submitted_login: Option<String>,
    pub observed: Option<ObservedOutcome>,
    pub failure_phase: Option<FailurePhase>,
    pub error: Option<String>,
}

/// Result of running a suite of scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn from_results(results: Vec<ScenarioResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs login scenarios with a login driver and a fixture registry
pub struct TestRunner<D, B> {
    driver: D,
    registry: UserRegistry<B>,
    app: Option<AppHandle>,
    output_dir: PathBuf,
}

impl TestRunner<PlaywrightHandle, HttpRegistrationBackend> {
    /// Runner that drives Playwright and registers users over HTTP
    pub fn from_config(config: &HarnessConfig) -> E2eResult<Self> {
        config.validate()?;
        let backend = HttpRegistrationBackend::new(&config.backend_config())?;
        info!("Registering fixtures at {}", backend.endpoint());
        let generator = IdentityGenerator::new(config.identity.clone())?;
        let driver = PlaywrightHandle::new(config.playwright_config())?;

        Ok(Self::new(
            driver,
            UserRegistry::with_generator(generator, backend),
            config.output_dir.clone(),
        ))
    }
}

impl<D: LoginDriver, B: RegistrationBackend> TestRunner<D, B> {
    pub fn new(driver: D, registry: UserRegistry<B>, output_dir: PathBuf) -> Self {
        Self {
            driver,
            registry,
            app: None,
            output_dir,
        }
    }

    pub fn registry(&self) -> &UserRegistry<B> {
        &self.registry
    }

    /// Attach to (or start) the application under test
    pub async fn start_app(&mut self, config: &HarnessConfig) -> E2eResult<()> {
        if self.app.is_some() {
            return Ok(()); // Already running
        }
        self.app = Some(AppHandle::start(config.app_config()).await?);
        Ok(())
    }

    /// Stop the application if the runner started it
    pub async fn stop_app(&mut self) -> E2eResult<()> {
        if let Some(mut app) = self.app.take() {
            if app.is_managed() {
                app.shutdown().await?;
            }
        }
        Ok(())
    }

    /// Run a list of scenarios in order
    pub async fn run_specs(&self, specs: &[ScenarioSpec]) -> SuiteResult {
        let start = Instant::now();
        let mut results = Vec::with_capacity(specs.len());

        info!("Running {} scenario(s)...", specs.len());

        for spec in specs {
            let result = self.run_scenario(spec).await;
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let suite = SuiteResult::from_results(results, start.elapsed().as_millis() as u64);
        info!(
            "Scenario results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );
        suite
    }

    /// Run scenarios carrying `tag`
    pub async fn run_tagged(&self, specs: &[ScenarioSpec], tag: &str) -> SuiteResult {
        let filtered: Vec<ScenarioSpec> = ScenarioSpec::filter_by_tag(specs, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_specs(&filtered).await
    }

    /// Run the scenario called `name`
    pub async fn run_named(&self, specs: &[ScenarioSpec], name: &str) -> E2eResult<SuiteResult> {
        let spec = specs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Scenario not found: {}", name)))?;
        Ok(self.run_specs(std::slice::from_ref(spec)).await)
    }

    /// Run a single scenario.
    ///
    /// A fixture failure ends the scenario before the login form is touched.
    pub async fn run_scenario(&self, spec: &ScenarioSpec) -> ScenarioResult {
        let start = Instant::now();
        debug!("Running scenario: {}", spec.name);

        let mut result = ScenarioResult {
            name: spec.name.clone(),
            success: false,
            duration_ms: 0,
            precondition: spec.precondition,
            substitute: spec.substitute,
            expected: spec.expected_outcome(),
            submitted_login: None,
            observed: None,
            failure_phase: None,
            error: None,
        };

        let outcome = self.execute(spec, &mut result).await;
        if let Err((phase, e)) = outcome {
            if phase == FailurePhase::Fixture {
                warn!("Scenario {} aborted before UI interaction", spec.name);
            }
            result.failure_phase = Some(phase);
            result.error = Some(e.to_string());
        } else {
            result.success = true;
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn execute(
        &self,
        spec: &ScenarioSpec,
        result: &mut ScenarioResult,
    ) -> Result<(), (FailurePhase, E2eError)> {
        let fixture = |e: loginprobe_common::Error| (FailurePhase::Fixture, E2eError::from(e));

        let record = self.prepare_fixture(spec.precondition).await.map_err(fixture)?;
        let submitted = self
            .submitted_credentials(&record, spec.substitute)
            .map_err(fixture)?;
        result.submitted_login = Some(submitted.login().to_string());

        let observed = self
            .driver
            .attempt_login(&submitted)
            .await
            .map_err(|e| (FailurePhase::Browser, e))?;
        result.observed = Some(observed.clone());

        match observed.classify() {
            Some(outcome) if outcome == result.expected => Ok(()),
            _ => Err((
                FailurePhase::Outcome,
                E2eError::OutcomeMismatch {
                    expected: result.expected,
                    observed: observed.to_string(),
                },
            )),
        }
    }

    async fn prepare_fixture(&self, precondition: Precondition) -> loginprobe_common::Result<UserRecord> {
        match precondition {
            Precondition::Registered(status) => self.registry.create_registered_user(status).await,
            Precondition::NotRegistered(status) => self.registry.create_user(status),
        }
    }

    fn submitted_credentials(
        &self,
        record: &UserRecord,
        substitution: Substitution,
    ) -> loginprobe_common::Result<UserRecord> {
        Ok(match substitution {
            Substitution::None => record.clone(),
            Substitution::Login => record.with_login(self.registry.fresh_login()?),
            Substitution::Password => {
                record.with_password(self.registry.fresh_password(record.password()))
            }
        })
    }

    /// Write suite results to JSON file
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
