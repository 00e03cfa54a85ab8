use serde::{Deserialize, Serialize};

/// Canned response substituted for a matching outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub body: String,
}

fn default_status() -> u16 {
    200
}

fn default_content_type() -> String {
    "application/json".to_string()
}

impl ResponseTemplate {
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: default_content_type(),
            body: value.to_string(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// URL glob pattern mapped to a response template.
///
/// Patterns follow the usual route syntax: `**/api/notifications`,
/// `*://*/api/*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockRule {
    pub pattern: String,
    pub response: ResponseTemplate,
}

impl MockRule {
    pub fn new(pattern: impl Into<String>, response: ResponseTemplate) -> Self {
        Self {
            pattern: pattern.into(),
            response,
        }
    }
}
