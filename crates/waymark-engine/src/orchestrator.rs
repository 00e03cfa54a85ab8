//! Top-level scenario driver. Sole owner of the session's lifetime.

use crate::backend::Backend;
use crate::config::WaymarkConfig;
use crate::evidence::EvidenceRecorder;
use crate::flow::{CancelHandle, FlowEngine, RunControl, StepTimeouts};
use crate::mock::MockRegistry;
use crate::resolution::{LocatorResolver, Resolution};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use waymark_common::report::{CheckpointStatus, RunReport, RunStatus};
use waymark_common::scenario::{OnboardingDismissal, ScenarioDefinition};

pub const NAVIGATION_CHECKPOINT: &str = "navigation";
pub const ONBOARDING_CHECKPOINT: &str = "onboarding-dismissed";
pub const MOCK_CHECKPOINT: &str = "mock-registration";

pub struct ScenarioRunner {
    resolver: LocatorResolver,
    timeouts: StepTimeouts,
    onboarding_timeout: Duration,
    evidence_dir: Option<PathBuf>,
    cancel: CancelHandle,
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(&WaymarkConfig::default())
    }
}

impl ScenarioRunner {
    pub fn new(config: &WaymarkConfig) -> Self {
        Self {
            resolver: LocatorResolver::new(config.runner.poll_interval()),
            timeouts: config.runner.step_timeouts(),
            onboarding_timeout: Duration::from_millis(config.runner.onboarding_timeout_ms),
            evidence_dir: config
                .evidence
                .enabled
                .then(|| config.evidence.dir.clone()),
            cancel: CancelHandle::new(),
        }
    }

    /// Handle that stops the run at the next step boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run `scenario` on `backend`. The backend is always closed before
    /// this returns, whatever the outcome.
    pub async fn run<B: Backend>(&self, mut backend: B, scenario: &ScenarioDefinition) -> RunReport {
        info!("Running scenario '{}' against {}", scenario.name, scenario.entry_url);
        let mut recorder = match &self.evidence_dir {
            Some(dir) => EvidenceRecorder::new(&scenario.name, dir),
            None => EvidenceRecorder::without_capture(&scenario.name),
        };

        // Rules are rejected before any session exists.
        let registry = match MockRegistry::from_rules(&scenario.mocks) {
            Ok(registry) => registry,
            Err(e) => {
                recorder.checkpoint(MOCK_CHECKPOINT, CheckpointStatus::Failed, Some(e.to_string()));
                return recorder.finish(RunStatus::Halted);
            }
        };

        let status = self
            .drive(&mut backend, scenario, registry, &mut recorder)
            .await;

        if let Err(e) = backend.close().await {
            warn!("Failed to close session cleanly: {}", e);
        }
        let report = recorder.finish(status);
        info!("Scenario '{}' finished: {}", report.scenario, report.status);
        report
    }

    async fn drive<B: Backend>(
        &self,
        backend: &mut B,
        scenario: &ScenarioDefinition,
        registry: MockRegistry,
        recorder: &mut EvidenceRecorder,
    ) -> RunStatus {
        if let Err(e) = backend.launch().await {
            recorder.checkpoint(
                NAVIGATION_CHECKPOINT,
                CheckpointStatus::Failed,
                Some(format!("session could not be opened: {}", e)),
            );
            return RunStatus::NavigationFailed;
        }

        // Interception has to be live before the first request goes out.
        let router = match registry.activate(backend).await {
            Ok(router) => router,
            Err(e) => {
                recorder.checkpoint(MOCK_CHECKPOINT, CheckpointStatus::Failed, Some(e.to_string()));
                return RunStatus::Halted;
            }
        };

        let nav_timeout = scenario
            .navigation_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.timeouts.navigation);
        let navigated = tokio::time::timeout(
            nav_timeout,
            backend.navigate(&scenario.entry_url, nav_timeout),
        )
        .await;
        match navigated {
            Ok(Ok(nav)) => {
                let diagnostic = match nav.status {
                    Some(code) => format!("loaded {} ({}) [HTTP {}]", nav.url, nav.title, code),
                    None => format!("loaded {} ({})", nav.url, nav.title),
                };
                recorder.checkpoint(NAVIGATION_CHECKPOINT, CheckpointStatus::Passed, Some(diagnostic));
            }
            Ok(Err(e)) => {
                recorder.checkpoint(NAVIGATION_CHECKPOINT, CheckpointStatus::Failed, Some(e.to_string()));
                return RunStatus::NavigationFailed;
            }
            Err(_) => {
                recorder.checkpoint(
                    NAVIGATION_CHECKPOINT,
                    CheckpointStatus::Failed,
                    Some(format!(
                        "{} unreachable within {} ms",
                        scenario.entry_url,
                        nav_timeout.as_millis()
                    )),
                );
                return RunStatus::NavigationFailed;
            }
        }

        if let Some(onboarding) = &scenario.onboarding {
            self.dismiss_onboarding(backend, onboarding, recorder).await;
        }
        if let Some(ms) = scenario.settle_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        let control = RunControl::with_budget(
            self.cancel.clone(),
            scenario.budget_ms.map(Duration::from_millis),
        );
        let engine = FlowEngine::new(self.resolver, self.timeouts);
        let outcome = engine
            .run_with(backend, &scenario.steps, recorder, &control)
            .await;

        for pattern in router.patterns() {
            debug!("Mock '{}' answered {} request(s)", pattern, router.hits(pattern));
        }
        outcome.into()
    }

    /// Absence of the overlay is normal and leaves no trace in the report.
    async fn dismiss_onboarding<B: Backend>(
        &self,
        backend: &mut B,
        onboarding: &OnboardingDismissal,
        recorder: &mut EvidenceRecorder,
    ) {
        let timeout = onboarding
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.onboarding_timeout);

        let element = match self
            .resolver
            .resolve_within(backend, &onboarding.trigger, timeout)
            .await
        {
            Resolution::Found { element, .. } => element,
            Resolution::NotFound { .. } => {
                debug!("No onboarding overlay ('{}'), continuing", onboarding.trigger.name);
                return;
            }
        };

        if let Err(e) = backend.click(&element).await {
            recorder.checkpoint(
                ONBOARDING_CHECKPOINT,
                CheckpointStatus::Failed,
                Some(format!("click on '{}' failed: {}", onboarding.trigger.name, e)),
            );
            return;
        }

        if let Some(overlay) = &onboarding.wait_hidden
            && !self.resolver.wait_until_absent(backend, overlay, timeout).await
        {
            recorder.checkpoint(
                ONBOARDING_CHECKPOINT,
                CheckpointStatus::Failed,
                Some(format!("'{}' still visible after dismissal", overlay.name)),
            );
            return;
        }
        recorder.checkpoint(ONBOARDING_CHECKPOINT, CheckpointStatus::Passed, None);
    }
}
