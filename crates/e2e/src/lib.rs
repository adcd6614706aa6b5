//! LoginProbe E2E Scenario Runner
//!
//! This crate drives the login form of a running application and checks
//! what it shows against the fixture outcome contract:
//! - Attaches to (or spawns) the application under test
//! - Builds and registers user fixtures out of band
//! - Controls Playwright via generated Node scripts
//! - Parses declarative YAML scenario specs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  E2E Scenario Runner (Rust)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                  │
//! │    ├── start_app() -> AppHandle                              │
//! │    ├── prepare fixture   (UserRegistry -> backend)          │
//! │    ├── attempt_login()   (LoginDriver -> ObservedOutcome)   │
//! │    └── compare with expected_outcome(precondition, subst)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioSpec (YAML)                                        │
//! │    ├── name, description, tags                              │
//! │    ├── precondition: registered | not_registered (status)   │
//! │    ├── substitute: none | login | password                  │
//! │    └── expect: Option<Outcome>                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod playwright;
pub mod runner;
pub mod server;
pub mod spec;

pub use config::HarnessConfig;
pub use error::{E2eError, E2eResult};
pub use playwright::{LoginDriver, ObservedOutcome};
pub use runner::{ScenarioResult, SuiteResult, TestRunner};
pub use spec::ScenarioSpec;
