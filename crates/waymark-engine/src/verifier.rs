//! Evaluation of step preconditions and assertions against the live page.

use crate::backend::Backend;
use crate::resolution::{LocatorResolver, Resolution};
use regex::Regex;
use std::time::Duration;
use tokio::time::Instant;
use waymark_common::flow::{Assertion, Precondition};

/// Outcome of a check, with a diagnostic when it did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub diagnostic: Option<String>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            diagnostic: None,
        }
    }

    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            passed: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

pub struct Verifier<'r> {
    resolver: &'r LocatorResolver,
}

impl<'r> Verifier<'r> {
    pub fn new(resolver: &'r LocatorResolver) -> Self {
        Self { resolver }
    }

    pub async fn precondition<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        precondition: &Precondition,
        timeout: Duration,
    ) -> Verdict {
        match precondition {
            Precondition::Always => Verdict::pass(),
            Precondition::Visible(query) => {
                let res = self.resolver.resolve_within(backend, query, timeout).await;
                if res.is_found() {
                    Verdict::pass()
                } else {
                    Verdict::fail(format!(
                        "precondition not met: '{}' not visible ({})",
                        query.name,
                        res.attempted_summary()
                    ))
                }
            }
            Precondition::Absent(query) => {
                if self.resolver.wait_until_absent(backend, query, timeout).await {
                    Verdict::pass()
                } else {
                    Verdict::fail(format!("precondition not met: '{}' still visible", query.name))
                }
            }
        }
    }

    pub async fn assertion<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        assertion: &Assertion,
        timeout: Duration,
    ) -> Verdict {
        match assertion {
            Assertion::Visible(query) => {
                match self.resolver.resolve_within(backend, query, timeout).await {
                    Resolution::Found { .. } => Verdict::pass(),
                    res @ Resolution::NotFound { .. } => Verdict::fail(format!(
                        "expected '{}' visible ({})",
                        query.name,
                        res.attempted_summary()
                    )),
                }
            }
            Assertion::Hidden(query) => {
                if self.resolver.wait_until_absent(backend, query, timeout).await {
                    Verdict::pass()
                } else {
                    Verdict::fail(format!("expected '{}' hidden, still visible", query.name))
                }
            }
            Assertion::TextPresent(text) => {
                self.poll_text(backend, timeout, |content| content.contains(text.as_str()))
                    .await
                    .unwrap_or_else(|| Verdict::fail(format!("text {:?} not present", text)))
            }
            Assertion::TextAbsent(text) => {
                self.poll_text(backend, timeout, |content| !content.contains(text.as_str()))
                    .await
                    .unwrap_or_else(|| Verdict::fail(format!("text {:?} still present", text)))
            }
            Assertion::TextMatches(pattern) => {
                let re = match Regex::new(pattern) {
                    Ok(re) => re,
                    Err(e) => return Verdict::fail(format!("invalid pattern {:?}: {}", pattern, e)),
                };
                self.poll_text(backend, timeout, |content| re.is_match(content))
                    .await
                    .unwrap_or_else(|| Verdict::fail(format!("no text matching {:?}", pattern)))
            }
        }
    }

    /// Poll the page text until `holds` is true. `None` means it never held.
    async fn poll_text<B, F>(&self, backend: &mut B, timeout: Duration, holds: F) -> Option<Verdict>
    where
        B: Backend + ?Sized,
        F: Fn(&str) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let read_error = match backend.text_content().await {
                Ok(content) if holds(&content) => return Some(Verdict::pass()),
                Ok(_) => None,
                Err(e) => Some(e.to_string()),
            };
            let now = Instant::now();
            if now >= deadline {
                return read_error.map(|e| Verdict::fail(format!("could not read page text: {}", e)));
            }
            tokio::time::sleep(self.resolver.poll_interval().min(deadline - now)).await;
        }
    }
}
