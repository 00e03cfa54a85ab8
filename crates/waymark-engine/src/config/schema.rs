use crate::flow::StepTimeouts;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaymarkConfig {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,
    #[serde(default = "default_precondition_timeout_ms")]
    pub precondition_timeout_ms: u64,
    #[serde(default = "default_action_timeout_ms")]
    pub action_timeout_ms: u64,
    #[serde(default = "default_assertion_timeout_ms")]
    pub assertion_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_onboarding_timeout_ms")]
    pub onboarding_timeout_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: default_navigation_timeout_ms(),
            precondition_timeout_ms: default_precondition_timeout_ms(),
            action_timeout_ms: default_action_timeout_ms(),
            assertion_timeout_ms: default_assertion_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            onboarding_timeout_ms: default_onboarding_timeout_ms(),
        }
    }
}

impl RunnerConfig {
    pub fn step_timeouts(&self) -> StepTimeouts {
        StepTimeouts {
            precondition: Duration::from_millis(self.precondition_timeout_ms),
            action: Duration::from_millis(self.action_timeout_ms),
            assertion: Duration::from_millis(self.assertion_timeout_ms),
            navigation: Duration::from_millis(self.navigation_timeout_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_navigation_timeout_ms() -> u64 {
    60000
}

fn default_precondition_timeout_ms() -> u64 {
    1000
}

fn default_action_timeout_ms() -> u64 {
    5000
}

fn default_assertion_timeout_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_onboarding_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_evidence_dir")]
    pub dir: PathBuf,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: default_evidence_dir(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_evidence_dir() -> PathBuf {
    PathBuf::from("verification")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    // Mobile layout the wizard was designed for.
    fn default() -> Self {
        Self {
            width: 375,
            height: 812,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub chrome_bin: Option<PathBuf>,
}
