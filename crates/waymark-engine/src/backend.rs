use crate::mock::MockRouter;
use async_trait::async_trait;
use std::time::Duration;
pub use waymark_common::error::backend_error::BackendError;
use waymark_common::query::Strategy;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    /// HTTP status of the main document, when the backend can tell.
    pub status: Option<u16>,
}

/// Opaque reference to an element found by [`Backend::find_visible`].
///
/// Only valid until the page re-renders; callers use it within the same
/// operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub id: u64,
    /// Short description (tag and text) for diagnostics.
    pub label: String,
}

impl ElementHandle {
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// The browser capability the runner drives.
///
/// Any automation engine that can offer these operations is substitutable.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, connect to remote, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a URL, giving up after `timeout`.
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResult, BackendError>;

    /// All currently visible elements matching `strategy`, in document order.
    async fn find_visible(
        &mut self,
        strategy: &Strategy,
    ) -> Result<Vec<ElementHandle>, BackendError>;

    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError>;

    /// Replace the element's value, firing input events.
    async fn fill(&mut self, element: &ElementHandle, value: &str) -> Result<(), BackendError>;

    /// Tick a checkbox. The default clicks it.
    async fn check(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        self.click(element).await
    }

    async fn is_visible(&mut self, element: &ElementHandle) -> Result<bool, BackendError>;

    /// Route every outbound request through `router` for the rest of the session.
    async fn intercept(&mut self, _router: MockRouter) -> Result<(), BackendError> {
        Err(BackendError::NotSupported("intercept".into()))
    }

    /// Capture a screenshot of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError>;

    /// Full rendered text of the page body.
    async fn text_content(&mut self) -> Result<String, BackendError>;
}
