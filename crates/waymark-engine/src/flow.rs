//! Sequential step engine for conditionally branching UI flows.

use crate::backend::Backend;
use crate::evidence::EvidenceRecorder;
use crate::resolution::{LocatorResolver, Resolution};
use crate::verifier::{Verdict, Verifier};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};
use waymark_common::flow::{Action, FlowStep};
use waymark_common::report::{CheckpointStatus, RunReport, RunStatus};

/// Per-operation bounds used while running steps.
#[derive(Debug, Clone, Copy)]
pub struct StepTimeouts {
    pub precondition: Duration,
    pub action: Duration,
    pub assertion: Duration,
    pub navigation: Duration,
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self {
            precondition: Duration::from_millis(1000),
            action: Duration::from_millis(5000),
            assertion: Duration::from_millis(2000),
            navigation: Duration::from_millis(60000),
        }
    }
}

/// Cooperative cancellation, observed between steps.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancellation plus an optional wall-clock deadline for one run.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub cancel: CancelHandle,
    pub deadline: Option<Instant>,
}

impl RunControl {
    pub fn with_budget(cancel: CancelHandle, budget: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: budget.map(|b| Instant::now() + b),
        }
    }

    fn stop_reason(&self) -> Option<&'static str> {
        if self.cancel.is_cancelled() {
            Some("run cancelled")
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some("run budget exceeded")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    Halted,
}

impl From<FlowOutcome> for RunStatus {
    fn from(outcome: FlowOutcome) -> Self {
        match outcome {
            FlowOutcome::Completed => RunStatus::Completed,
            FlowOutcome::Halted => RunStatus::Halted,
        }
    }
}

enum StepResult {
    Continue,
    Exit,
    Halt,
}

pub struct FlowEngine {
    resolver: LocatorResolver,
    timeouts: StepTimeouts,
}

impl Default for FlowEngine {
    fn default() -> Self {
        Self::new(LocatorResolver::default(), StepTimeouts::default())
    }
}

impl FlowEngine {
    pub fn new(resolver: LocatorResolver, timeouts: StepTimeouts) -> Self {
        Self { resolver, timeouts }
    }

    /// Run `steps` against `backend`, collecting checkpoints only.
    pub async fn run<B: Backend + ?Sized>(&self, backend: &mut B, steps: &[FlowStep]) -> RunReport {
        let mut recorder = EvidenceRecorder::without_capture("flow");
        let outcome = self
            .run_with(backend, steps, &mut recorder, &RunControl::default())
            .await;
        recorder.finish(outcome.into())
    }

    pub async fn run_with<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        steps: &[FlowStep],
        recorder: &mut EvidenceRecorder,
        control: &RunControl,
    ) -> FlowOutcome {
        for (cursor, step) in steps.iter().enumerate() {
            if let Some(reason) = control.stop_reason() {
                warn!("Stopping before step {} ('{}'): {}", cursor, step.id, reason);
                recorder.checkpoint(
                    "cancelled",
                    CheckpointStatus::Failed,
                    Some(format!("{} before step '{}'", reason, step.id)),
                );
                return FlowOutcome::Halted;
            }

            info!("Step {} '{}': {}", cursor, step.id, step.action.verb());
            match self.run_step(backend, step, recorder).await {
                StepResult::Continue => {}
                StepResult::Exit => {
                    info!("Step '{}' ends the flow", step.id);
                    return FlowOutcome::Completed;
                }
                StepResult::Halt => return FlowOutcome::Halted,
            }
        }
        FlowOutcome::Completed
    }

    async fn run_step<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        step: &FlowStep,
        recorder: &mut EvidenceRecorder,
    ) -> StepResult {
        let verifier = Verifier::new(&self.resolver);

        // 1. Precondition
        let gate = verifier
            .precondition(backend, &step.precondition, self.timeouts.precondition)
            .await;
        if !gate.passed {
            recorder.checkpoint(&step.id, CheckpointStatus::Skipped, gate.diagnostic);
            return StepResult::Continue;
        }

        // 2 + 3. Resolve the target and act
        if let Err(diagnostic) = self.perform(backend, &step.action).await {
            let evidence = if step.capture {
                recorder.capture_visual(backend, &step.id).await
            } else {
                None
            };
            recorder.checkpoint_with_evidence(
                &step.id,
                CheckpointStatus::Failed,
                Some(diagnostic),
                evidence,
            );
            return StepResult::Halt;
        }

        // 4. Post-action wait
        if let Some(ms) = step.wait_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        // 5. Assertion
        let verdict = match &step.assertion {
            Some(assertion) => {
                verifier
                    .assertion(backend, assertion, self.timeouts.assertion)
                    .await
            }
            None => Verdict::pass(),
        };

        let evidence = if step.capture {
            recorder.capture_visual(backend, &step.id).await
        } else {
            None
        };
        let passed = verdict.passed;
        recorder.checkpoint_with_evidence(
            &step.id,
            CheckpointStatus::from_passed(passed),
            verdict.diagnostic,
            evidence,
        );

        if !passed && step.critical {
            warn!("Critical step '{}' failed, halting", step.id);
            StepResult::Halt
        } else if step.exit {
            StepResult::Exit
        } else {
            StepResult::Continue
        }
    }

    /// Execute one action. `Err` carries the checkpoint diagnostic.
    async fn perform<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        action: &Action,
    ) -> Result<(), String> {
        if let Action::Navigate { url } = action {
            return backend
                .navigate(url, self.timeouts.navigation)
                .await
                .map(|_| ())
                .map_err(|e| format!("navigation to {} failed: {}", url, e));
        }

        let Some(query) = action.target() else {
            return Ok(());
        };
        let element = match self
            .resolver
            .resolve_within(backend, query, self.timeouts.action)
            .await
        {
            Resolution::Found { element, .. } => element,
            res @ Resolution::NotFound { .. } => {
                return Err(format!(
                    "target missing: '{}' ({})",
                    query.name,
                    res.attempted_summary()
                ));
            }
        };

        let result = match action {
            Action::Click(_) => backend.click(&element).await,
            Action::Check(_) => backend.check(&element).await,
            Action::Fill { value, .. } => backend.fill(&element, value).await,
            Action::Navigate { .. } | Action::Observe => Ok(()),
        };
        result.map_err(|e| format!("{} on '{}' failed: {}", action.verb(), query.name, e))
    }
}
