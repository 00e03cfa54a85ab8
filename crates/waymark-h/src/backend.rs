use crate::cdp::CdpClient;
use crate::{inject, intercept};
use async_trait::async_trait;
use chromiumoxide::page::ScreenshotParams;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use waymark_common::query::Strategy;
use waymark_engine::backend::{Backend, BackendError, ElementHandle, NavigationResult};
use waymark_engine::config::BrowserConfig;
use waymark_engine::mock::MockRouter;

/// Element reference as returned by the injected locator script.
#[derive(Debug, Deserialize)]
struct Located {
    id: u64,
    label: String,
}

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    config: BrowserConfig,
}

impl HeadlessBackend {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            client: None,
            config,
        }
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }

    fn client(&self) -> Result<&CdpClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    fn handle_selector(element: &ElementHandle) -> String {
        format!("[data-waymark-handle=\"{}\"]", element.id)
    }

    async fn navigation_result(page: &chromiumoxide::Page) -> Result<NavigationResult, BackendError> {
        let title = page.get_title().await.ok().flatten().unwrap_or_default();
        // data: and about: documents have no HTTP status.
        let status = inject::call::<Option<u16>>(page, "window.__waymark.documentStatus()")
            .await
            .unwrap_or(None);
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult {
            url,
            title,
            status,
        })
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(BrowserConfig::default())
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching headless backend (Chromium)");
        self.client = Some(CdpClient::launch(&self.config).await?);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client.close().await?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResult, BackendError> {
        let page = &self.client()?.page;
        info!("Navigating to: {}", url);
        match tokio::time::timeout(timeout, page.goto(url)).await {
            Err(_) => Err(BackendError::NavigationTimeout(timeout.as_millis() as u64)),
            Ok(Err(e)) => Err(BackendError::Navigation(e.to_string())),
            Ok(Ok(_)) => Self::navigation_result(page).await,
        }
    }

    async fn find_visible(
        &mut self,
        strategy: &Strategy,
    ) -> Result<Vec<ElementHandle>, BackendError> {
        let page = &self.client()?.page;
        let expression = format!(
            "window.__waymark.find({})",
            serde_json::to_string(strategy)?
        );
        let found: Vec<Located> = inject::call(page, &expression).await?;
        debug!("{} -> {} visible", strategy, found.len());
        Ok(found
            .into_iter()
            .map(|l| ElementHandle::new(l.id, l.label))
            .collect())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        let page = &self.client()?.page;
        let target = page
            .find_element(Self::handle_selector(element))
            .await
            .map_err(|_| BackendError::StaleElement { id: element.id })?;
        target
            .click()
            .await
            .map_err(|e| BackendError::Interaction(format!("click {}: {}", element.label, e)))?;
        Ok(())
    }

    async fn fill(&mut self, element: &ElementHandle, value: &str) -> Result<(), BackendError> {
        let page = &self.client()?.page;
        let expression = format!(
            "window.__waymark.fill({}, {})",
            element.id,
            serde_json::to_string(value)?
        );
        let filled: bool = inject::call(page, &expression).await?;
        if !filled {
            return Err(BackendError::StaleElement { id: element.id });
        }
        Ok(())
    }

    /// Clicks only when the box is not ticked yet.
    async fn check(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        let page = &self.client()?.page;
        let expression = format!("window.__waymark.checked({})", element.id);
        match inject::call::<Option<bool>>(page, &expression).await? {
            None => Err(BackendError::StaleElement { id: element.id }),
            Some(true) => {
                debug!("{} already checked", element.label);
                Ok(())
            }
            Some(false) => self.click(element).await,
        }
    }

    async fn is_visible(&mut self, element: &ElementHandle) -> Result<bool, BackendError> {
        let page = &self.client()?.page;
        inject::call(page, &format!("window.__waymark.visible({})", element.id)).await
    }

    async fn intercept(&mut self, router: MockRouter) -> Result<(), BackendError> {
        let client = self.client.as_mut().ok_or(BackendError::NotReady)?;
        info!("Intercepting requests for {} pattern(s)", router.patterns().len());
        let task = intercept::install(&client.page, router).await?;
        client.track(task);
        Ok(())
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        let page = &self.client()?.page;
        page.screenshot(ScreenshotParams::builder().build())
            .await
            .map_err(|e| BackendError::Other(format!("Screenshot failed: {}", e)))
    }

    async fn text_content(&mut self) -> Result<String, BackendError> {
        let page = &self.client()?.page;
        inject::call(page, "document.body ? document.body.innerText : ''").await
    }
}
