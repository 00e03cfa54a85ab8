use thiserror::Error;

/// Failures reported by a browser capability.
///
/// Absence of an element is never one of these: locating returns an empty
/// match list instead.
#[derive(Debug, Error)]
pub enum BackendError {
    // ============================================================
    // Session lifecycle
    // ============================================================
    #[error("Backend not ready")]
    NotReady,

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    // ============================================================
    // Navigation
    // ============================================================
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Navigation timed out after {0} ms")]
    NavigationTimeout(u64),

    // ============================================================
    // Element interaction
    // ============================================================
    #[error("Element handle {id} is stale (removed from DOM)")]
    StaleElement { id: u64 },

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    // ============================================================
    // Plumbing
    // ============================================================
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other: {0}")]
    Other(String),
}

impl BackendError {
    /// True for failures that mean the entry page could not be reached.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            BackendError::Navigation(_) | BackendError::NavigationTimeout(_) | BackendError::Launch(_)
        )
    }
}
