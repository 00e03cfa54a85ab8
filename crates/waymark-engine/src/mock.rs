//! Per-session request interception with canned responses.

use crate::backend::{Backend, BackendError};
use glob::{MatchOptions, Pattern};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::{debug, info};
use waymark_common::mock::{MockRule, ResponseTemplate};

#[derive(Debug, Error)]
pub enum MockError {
    #[error("Mock registration conflict: pattern '{0}' is already registered")]
    Conflict(String),
    #[error("Invalid mock pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

const URL_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

struct CompiledRule {
    rule: MockRule,
    pattern: Pattern,
    hits: AtomicUsize,
}

/// Rules collected before the session starts.
#[derive(Default)]
pub struct MockRegistry {
    rules: Vec<CompiledRule>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a scenario's rule list, in order.
    pub fn from_rules(rules: &[MockRule]) -> Result<Self, MockError> {
        let mut registry = Self::new();
        for rule in rules {
            registry.register(rule.clone())?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, rule: MockRule) -> Result<(), MockError> {
        if self.rules.iter().any(|r| r.rule.pattern == rule.pattern) {
            return Err(MockError::Conflict(rule.pattern));
        }
        let pattern = Pattern::new(&rule.pattern).map_err(|source| MockError::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        self.rules.push(CompiledRule {
            rule,
            pattern,
            hits: AtomicUsize::new(0),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freeze the rules into a router without installing it anywhere.
    pub fn into_router(self) -> MockRouter {
        MockRouter {
            rules: Arc::new(self.rules),
        }
    }

    /// Install the rules on `backend`. Returns the router so callers can
    /// inspect hit counts after the run.
    pub async fn activate<B: Backend + ?Sized>(
        self,
        backend: &mut B,
    ) -> Result<MockRouter, BackendError> {
        let router = self.into_router();
        if router.rules.is_empty() {
            return Ok(router);
        }
        info!("Installing {} mock rule(s)", router.rules.len());
        backend.intercept(router.clone()).await?;
        Ok(router)
    }
}

/// Shared, read-only view of a session's mock rules.
#[derive(Clone)]
pub struct MockRouter {
    rules: Arc<Vec<CompiledRule>>,
}

impl std::fmt::Debug for MockRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRouter")
            .field("patterns", &self.patterns())
            .finish()
    }
}

impl MockRouter {
    /// Response for `url`, first registered rule wins. `None` lets the
    /// request through untouched.
    pub fn respond(&self, url: &str) -> Option<ResponseTemplate> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.pattern.matches_with(url, URL_MATCH))?;
        rule.hits.fetch_add(1, Ordering::Relaxed);
        debug!("Mocked {} via '{}'", url, rule.rule.pattern);
        Some(rule.rule.response.clone())
    }

    pub fn patterns(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.rule.pattern.as_str()).collect()
    }

    /// Number of requests answered by the rule registered under `pattern`.
    pub fn hits(&self, pattern: &str) -> usize {
        self.rules
            .iter()
            .find(|r| r.rule.pattern == pattern)
            .map(|r| r.hits.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}
