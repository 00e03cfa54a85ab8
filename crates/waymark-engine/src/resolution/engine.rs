//! Ordered fallback resolution of element queries against the live page.

use super::result::Resolution;
use crate::backend::Backend;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use waymark_common::query::ElementQuery;

/// Poll interval used by bounded waits unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Result of one pass over a strategy chain.
enum Probe {
    Found(Resolution),
    /// Visible matches exist, but none usable under `require_unique`.
    Ambiguous,
    /// No match, and at least one strategy could not be evaluated.
    Errored,
    /// Every strategy answered with zero matches.
    Empty,
}

#[derive(Debug, Clone, Copy)]
pub struct LocatorResolver {
    poll_interval: Duration,
}

impl Default for LocatorResolver {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl LocatorResolver {
    pub fn new(poll_interval: Duration) -> Self {
        // A zero interval would spin on the backend.
        let poll_interval = if poll_interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            poll_interval
        };
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Probe once without waiting.
    pub async fn resolve<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        query: &ElementQuery,
    ) -> Resolution {
        self.resolve_within(backend, query, Duration::ZERO).await
    }

    /// Probe repeatedly until a strategy matches or `timeout` elapses.
    ///
    /// A zero timeout probes exactly once.
    pub async fn resolve_within<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        query: &ElementQuery,
        timeout: Duration,
    ) -> Resolution {
        let deadline = Instant::now() + timeout;
        loop {
            if let Probe::Found(found) = self.probe(backend, query).await {
                return found;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }

        debug!("'{}' not found within {:?}", query.name, timeout);
        Resolution::NotFound {
            attempted: query.describe_strategies(),
        }
    }

    /// Wait until no strategy yields a visible match. Returns `true` once a
    /// full pass answers cleanly with zero matches, `false` if the element is
    /// still present (or could not be checked) at the deadline.
    pub async fn wait_until_absent<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        query: &ElementQuery,
        timeout: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.probe(backend, query).await {
                Probe::Empty => return true,
                Probe::Errored => debug!("'{}' absence unconfirmed, probe errored", query.name),
                Probe::Found(_) | Probe::Ambiguous => {}
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// One pass over the strategy chain.
    async fn probe<B: Backend + ?Sized>(&self, backend: &mut B, query: &ElementQuery) -> Probe {
        let mut errored = false;
        let mut ambiguous = false;
        for (index, strategy) in query.strategies.iter().enumerate() {
            let mut matches = match backend.find_visible(strategy).await {
                Ok(matches) => matches,
                Err(e) => {
                    debug!("'{}' strategy {} ({}) errored: {}", query.name, index, strategy, e);
                    errored = true;
                    continue;
                }
            };

            match matches.len() {
                0 => continue,
                1 => {}
                n if query.require_unique => {
                    debug!(
                        "'{}' strategy {} ({}) is ambiguous ({} matches), trying next",
                        query.name, index, strategy, n
                    );
                    ambiguous = true;
                    continue;
                }
                _ => {}
            }

            let element = matches.swap_remove(0);
            debug!(
                "'{}' resolved by strategy {} ({}) -> {}",
                query.name, index, strategy, element.label
            );
            return Probe::Found(Resolution::Found {
                element,
                strategy_index: index,
            });
        }

        if ambiguous {
            Probe::Ambiguous
        } else if errored {
            Probe::Errored
        } else {
            Probe::Empty
        }
    }
}
