//! Checkpoint records and best-effort screenshots.

use crate::backend::Backend;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use waymark_common::report::{CheckpointRecord, CheckpointStatus, RunReport, RunStatus, now_ms};

pub struct EvidenceRecorder {
    report: RunReport,
    dir: Option<PathBuf>,
    captures: usize,
}

impl EvidenceRecorder {
    /// Recorder that writes screenshots under `dir`.
    pub fn new(scenario: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            report: RunReport::new(scenario),
            dir: Some(dir.into()),
            captures: 0,
        }
    }

    /// Recorder that keeps checkpoints only; visual capture is a no-op.
    pub fn without_capture(scenario: impl Into<String>) -> Self {
        Self {
            report: RunReport::new(scenario),
            dir: None,
            captures: 0,
        }
    }

    pub fn checkpoint(&mut self, name: &str, status: CheckpointStatus, diagnostic: Option<String>) {
        self.checkpoint_with_evidence(name, status, diagnostic, None);
    }

    pub fn checkpoint_with_evidence(
        &mut self,
        name: &str,
        status: CheckpointStatus,
        diagnostic: Option<String>,
        evidence: Option<PathBuf>,
    ) {
        match status {
            CheckpointStatus::Failed => warn!(
                "checkpoint '{}' failed: {}",
                name,
                diagnostic.as_deref().unwrap_or("-")
            ),
            _ => info!("checkpoint '{}' {:?}", name, status),
        }
        self.report.checkpoints.push(CheckpointRecord {
            name: name.to_string(),
            timestamp_ms: now_ms(),
            status,
            evidence,
            diagnostic,
        });
    }

    /// Screenshot the page and persist it. Failures are logged and yield
    /// `None`; they never affect the run.
    pub async fn capture_visual<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        name: &str,
    ) -> Option<PathBuf> {
        let dir = self.dir.clone()?;
        self.captures += 1;
        let path = dir.join(format!("{:02}-{}.png", self.captures, sanitize(name)));

        let bytes = match backend.screenshot().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Screenshot '{}' failed: {}", name, e);
                return None;
            }
        };
        if let Err(e) = write_file(&dir, &path, &bytes).await {
            warn!("Could not save screenshot to {}: {}", path.display(), e);
            return None;
        }
        info!("Screenshot saved to {} ({} bytes)", path.display(), bytes.len());
        Some(path)
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn finish(mut self, status: RunStatus) -> RunReport {
        self.report.status = status;
        self.report.finished_at_ms = now_ms();
        self.report
    }
}

async fn write_file(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, bytes).await
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
