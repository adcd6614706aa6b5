//! Declarative YAML scenario specification

use serde::{Deserialize, Serialize};
use std::path::Path;

use loginprobe_common::{expected_outcome, Outcome, Precondition, Substitution, UserStatus};

use crate::error::{E2eError, E2eResult};

/// A login scenario: fixture state plus which submitted field is replaced.
/// The expected outcome always follows from these two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Backend state of the fixture before the UI is driven, written as a
    /// one-entry map (`registered: active`)
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub precondition: Precondition,

    /// Field replaced by a fresh random value before submitting
    #[serde(default)]
    pub substitute: Substitution,

    /// Optional restatement of the expected outcome; must agree with the
    /// outcome contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<Outcome>,
}

impl ScenarioSpec {
    pub fn new(name: &str, description: &str, precondition: Precondition, substitute: Substitution) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tags: vec!["auth".to_string()],
            precondition,
            substitute,
            expect: None,
        }
    }

    /// Outcome the application must show for this scenario
    pub fn expected_outcome(&self) -> Outcome {
        expected_outcome(self.precondition, self.substitute)
    }

    /// Check the spec is consistent with the outcome contract
    pub fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::SpecParse("scenario name must not be empty".to_string()));
        }
        if let Some(stated) = self.expect {
            let derived = self.expected_outcome();
            if stated != derived {
                return Err(E2eError::SpecParse(format!(
                    "{}: states expected outcome '{}' but its precondition implies '{}'",
                    self.name, stated, derived
                )));
            }
        }
        Ok(())
    }

    /// Parse a scenario spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a scenario spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenario specs from a directory, sorted by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        if !dir.is_dir() {
            return Err(E2eError::SpecParse(format!(
                "spec directory not found: {}",
                dir.display()
            )));
        }

        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            if specs.iter().any(|s: &Self| s.name == spec.name) {
                return Err(E2eError::SpecParse(format!(
                    "duplicate scenario name '{}'",
                    spec.name
                )));
            }
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    /// The login regression suite
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new(
                "active-registered-user",
                "Should successfully login with active registered user",
                Precondition::Registered(UserStatus::Active),
                Substitution::None,
            ),
            Self::new(
                "not-registered-user",
                "Should get error message if login with not registered user",
                Precondition::NotRegistered(UserStatus::Active),
                Substitution::None,
            ),
            Self::new(
                "blocked-registered-user",
                "Should get error message if login with blocked registered user",
                Precondition::Registered(UserStatus::Blocked),
                Substitution::None,
            ),
            Self::new(
                "wrong-login",
                "Should get error message if login with wrong login",
                Precondition::Registered(UserStatus::Active),
                Substitution::Login,
            ),
            Self::new(
                "wrong-password",
                "Should get error message if login with wrong password",
                Precondition::Registered(UserStatus::Active),
                Substitution::Password,
            ),
        ]
    }
}
