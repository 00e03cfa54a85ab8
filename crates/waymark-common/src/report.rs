//! Structured run evidence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    Passed,
    Failed,
    Skipped,
}

impl CheckpointStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            CheckpointStatus::Passed
        } else {
            CheckpointStatus::Failed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub status: CheckpointStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl CheckpointRecord {
    pub fn passed(&self) -> bool {
        self.status == CheckpointStatus::Passed
    }
}

/// Overall outcome of a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Completed,
    Halted,
    NavigationFailed,
}

impl RunStatus {
    /// Process exit code used by the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::Halted => 1,
            RunStatus::NavigationFailed => 2,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Completed => "completed",
            RunStatus::Halted => "halted",
            RunStatus::NavigationFailed => "navigation-failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub status: RunStatus,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub checkpoints: Vec<CheckpointRecord>,
}

impl RunReport {
    pub fn new(scenario: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            scenario: scenario.into(),
            status: RunStatus::Completed,
            started_at_ms: now,
            finished_at_ms: now,
            checkpoints: Vec::new(),
        }
    }

    pub fn checkpoint(&self, name: &str) -> Option<&CheckpointRecord> {
        self.checkpoints.iter().find(|c| c.name == name)
    }

    pub fn last(&self) -> Option<&CheckpointRecord> {
        self.checkpoints.last()
    }

    pub fn count(&self, status: CheckpointStatus) -> usize {
        self.checkpoints.iter().filter(|c| c.status == status).count()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One line per checkpoint, for terminal output.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Scenario '{}': {}", self.scenario, self.status)];
        for c in &self.checkpoints {
            let mark = match c.status {
                CheckpointStatus::Passed => "PASS",
                CheckpointStatus::Failed => "FAIL",
                CheckpointStatus::Skipped => "SKIP",
            };
            let mut line = format!("  [{}] {}", mark, c.name);
            if let Some(diag) = &c.diagnostic {
                line.push_str(&format!(" - {}", diag));
            }
            if let Some(path) = &c.evidence {
                line.push_str(&format!(" ({})", path.display()));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
