//! Data-only scenario definitions, loadable from YAML or JSON.

use crate::flow::FlowStep;
use crate::mock::MockRule;
use crate::query::ElementQuery;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse scenario YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to parse scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid entry URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Duplicate step id '{0}'")]
    DuplicateStep(String),
    #[error("Mock registration conflict: pattern '{0}' registered twice")]
    MockConflict(String),
    #[error("Scenario '{0}' has no steps")]
    Empty(String),
}

/// Transient overlay dismissed after navigation when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingDismissal {
    /// Element to click (e.g. a language choice on a preloader).
    pub trigger: ElementQuery,
    /// Overlay expected to disappear after the click.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_hidden: Option<ElementQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    pub entry_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_timeout_ms: Option<u64>,
    #[serde(default)]
    pub mocks: Vec<MockRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<OnboardingDismissal>,
    /// Pause after onboarding so client-side content can render.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_ms: Option<u64>,
    /// Wall-clock budget for the step loop, enforced between steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_ms: Option<u64>,
    pub steps: Vec<FlowStep>,
}

impl ScenarioDefinition {
    pub fn from_yaml(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_yaml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_json(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load by extension: `.json` is JSON, everything else YAML.
    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        url::Url::parse(&self.entry_url).map_err(|e| ScenarioError::InvalidUrl {
            url: self.entry_url.clone(),
            reason: e.to_string(),
        })?;

        if self.steps.is_empty() {
            return Err(ScenarioError::Empty(self.name.clone()));
        }

        let mut ids = HashSet::new();
        for step in &self.steps {
            if !ids.insert(step.id.as_str()) {
                return Err(ScenarioError::DuplicateStep(step.id.clone()));
            }
        }

        let mut patterns = HashSet::new();
        for rule in &self.mocks {
            if !patterns.insert(rule.pattern.as_str()) {
                return Err(ScenarioError::MockConflict(rule.pattern.clone()));
            }
        }
        Ok(())
    }
}
