//! Semantic element descriptions and the concrete strategies used to find them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One concrete technique for locating an element in the live page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Strategy {
    /// `data-testid` attribute equality.
    TestId { value: String },
    /// ARIA role, optionally narrowed by accessible name (substring).
    Role {
        role: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Visible text. Substring match unless `exact`.
    Text {
        text: String,
        #[serde(default)]
        exact: bool,
    },
    /// Raw CSS selector.
    Css { selector: String },
    /// Clickable element hosting an icon with this class (e.g. `lucide-bell`).
    IconClass { class: String },
    /// Attribute whose value contains the given substring.
    Attribute { name: String, contains: String },
    /// Input placeholder equality.
    Placeholder { value: String },
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::TestId { value } => write!(f, "test-id={}", value),
            Strategy::Role { role, name: Some(name) } => write!(f, "role={}[name*={:?}]", role, name),
            Strategy::Role { role, name: None } => write!(f, "role={}", role),
            Strategy::Text { text, exact: true } => write!(f, "text=={:?}", text),
            Strategy::Text { text, exact: false } => write!(f, "text={:?}", text),
            Strategy::Css { selector } => write!(f, "css={}", selector),
            Strategy::IconClass { class } => write!(f, "icon=.{}", class),
            Strategy::Attribute { name, contains } => write!(f, "[{}*={:?}]", name, contains),
            Strategy::Placeholder { value } => write!(f, "placeholder={:?}", value),
        }
    }
}

/// A UI target described semantically plus an ordered fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementQuery {
    /// Human readable description, used in diagnostics only.
    pub name: String,
    pub strategies: Vec<Strategy>,
    /// Treat a strategy yielding several visible matches as a non-match.
    #[serde(default)]
    pub require_unique: bool,
}

impl ElementQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategies: Vec::new(),
            require_unique: false,
        }
    }

    pub fn with(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn by_test_id(self, value: impl Into<String>) -> Self {
        self.with(Strategy::TestId {
            value: value.into(),
        })
    }

    pub fn by_role(self, role: impl Into<String>, name: Option<&str>) -> Self {
        self.with(Strategy::Role {
            role: role.into(),
            name: name.map(str::to_string),
        })
    }

    pub fn by_text(self, text: impl Into<String>) -> Self {
        self.with(Strategy::Text {
            text: text.into(),
            exact: false,
        })
    }

    pub fn by_exact_text(self, text: impl Into<String>) -> Self {
        self.with(Strategy::Text {
            text: text.into(),
            exact: true,
        })
    }

    pub fn by_css(self, selector: impl Into<String>) -> Self {
        self.with(Strategy::Css {
            selector: selector.into(),
        })
    }

    pub fn by_icon(self, class: impl Into<String>) -> Self {
        self.with(Strategy::IconClass {
            class: class.into(),
        })
    }

    pub fn by_attribute(self, name: impl Into<String>, contains: impl Into<String>) -> Self {
        self.with(Strategy::Attribute {
            name: name.into(),
            contains: contains.into(),
        })
    }

    pub fn by_placeholder(self, value: impl Into<String>) -> Self {
        self.with(Strategy::Placeholder {
            value: value.into(),
        })
    }

    pub fn unique(mut self) -> Self {
        self.require_unique = true;
        self
    }

    /// Strategy descriptions in declared order.
    pub fn describe_strategies(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declared_order() {
        let q = ElementQuery::new("bell")
            .by_role("button", Some("Powiadomienia"))
            .by_icon("lucide-bell");
        assert_eq!(
            q.describe_strategies(),
            vec![
                "role=button[name*=\"Powiadomienia\"]".to_string(),
                "icon=.lucide-bell".to_string()
            ]
        );
        assert!(!q.require_unique);
    }

    #[test]
    fn strategies_deserialize_from_tagged_yaml() {
        let yaml = r#"
name: amount input
require_unique: true
strategies:
  - by: placeholder
    value: "0"
  - by: css
    selector: "input[type='number']"
"#;
        let q: ElementQuery = serde_yaml::from_str(yaml).unwrap();
        assert!(q.require_unique);
        assert_eq!(
            q.strategies[0],
            Strategy::Placeholder {
                value: "0".into()
            }
        );
        assert!(matches!(q.strategies[1], Strategy::Css { .. }));
    }
}
