//! Declarative flow steps.

use crate::query::ElementQuery;
use serde::{Deserialize, Serialize};

/// Gate evaluated against live page state before a step runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precondition {
    #[default]
    Always,
    Visible(ElementQuery),
    Absent(ElementQuery),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Click(ElementQuery),
    Fill { target: ElementQuery, value: String },
    /// Tick a checkbox (no-op when already checked).
    Check(ElementQuery),
    Navigate { url: String },
    /// No interaction; the step only evaluates its assertion.
    Observe,
}

impl Action {
    pub fn target(&self) -> Option<&ElementQuery> {
        match self {
            Action::Click(q) | Action::Check(q) => Some(q),
            Action::Fill { target, .. } => Some(target),
            Action::Navigate { .. } | Action::Observe => None,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Action::Click(_) => "click",
            Action::Fill { .. } => "fill",
            Action::Check(_) => "check",
            Action::Navigate { .. } => "navigate",
            Action::Observe => "observe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assertion {
    Visible(ElementQuery),
    Hidden(ElementQuery),
    TextPresent(String),
    TextAbsent(String),
    /// Regular expression over the rendered page text.
    TextMatches(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStep {
    /// Also the checkpoint name recorded for this step.
    pub id: String,
    #[serde(default)]
    pub precondition: Precondition,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<Assertion>,
    #[serde(default)]
    pub critical: bool,
    /// Take a screenshot once the assertion has been evaluated.
    #[serde(default)]
    pub capture: bool,
    /// Early-terminal branch: once executed, the flow completes.
    #[serde(default)]
    pub exit: bool,
}

impl FlowStep {
    pub fn new(id: impl Into<String>, action: Action) -> Self {
        Self {
            id: id.into(),
            precondition: Precondition::Always,
            action,
            wait_ms: None,
            assertion: None,
            critical: false,
            capture: false,
            exit: false,
        }
    }

    pub fn when_visible(mut self, query: ElementQuery) -> Self {
        self.precondition = Precondition::Visible(query);
        self
    }

    pub fn when_absent(mut self, query: ElementQuery) -> Self {
        self.precondition = Precondition::Absent(query);
        self
    }

    pub fn wait(mut self, ms: u64) -> Self {
        self.wait_ms = Some(ms);
        self
    }

    pub fn expect(mut self, assertion: Assertion) -> Self {
        self.assertion = Some(assertion);
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn capture(mut self) -> Self {
        self.capture = true;
        self
    }

    pub fn exit(mut self) -> Self {
        self.exit = true;
        self
    }
}
