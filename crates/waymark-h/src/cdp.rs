use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::handler::viewport::Viewport as ChromeViewport;
use chromiumoxide::{Browser, BrowserConfig as ChromeConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use waymark_common::BackendError;
use waymark_engine::config::BrowserConfig;

/// A launched Chromium with one page and its background event tasks.
pub struct CdpClient {
    pub browser: Browser,
    pub page: Page,
    handler_task: JoinHandle<()>,
    listeners: Vec<JoinHandle<()>>,
    user_data_dir: PathBuf,
    cleanup_user_data_dir: bool,
}

impl CdpClient {
    pub async fn launch(config: &BrowserConfig) -> Result<Self, BackendError> {
        let viewport = config.viewport;
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(viewport.width, viewport.height)
            .viewport(ChromeViewport {
                width: viewport.width,
                height: viewport.height,
                ..Default::default()
            });

        let (user_data_dir, cleanup_user_data_dir) = resolve_user_data_dir()?;
        builder = builder.user_data_dir(&user_data_dir);

        if config.visible {
            tracing::info!("Launching browser in visible mode");
            builder = builder.with_head();
        } else {
            tracing::info!("Launching browser in headless mode");
        }

        // CHROME_BIN wins over the configured binary.
        let chrome_bin = std::env::var("CHROME_BIN")
            .ok()
            .map(PathBuf::from)
            .or_else(|| config.chrome_bin.clone());
        if let Some(bin) = chrome_bin {
            tracing::info!("Using custom Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let chrome_config = builder
            .build()
            .map_err(|e| BackendError::Launch(format!("invalid browser config: {}", e)))?;
        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BackendError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    tracing::debug!("Browser handler error (ignoring): {}", e);
                }
            }
            tracing::debug!("Browser handler task ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BackendError::Launch(format!("failed to open page: {}", e)))?;

        let listeners = vec![
            forward_console(&page).await?,
            accept_dialogs(&page).await?,
        ];

        Ok(Self {
            browser,
            page,
            handler_task,
            listeners,
            user_data_dir,
            cleanup_user_data_dir,
        })
    }

    /// Keep `task` alive until the client closes.
    pub(crate) fn track(&mut self, task: JoinHandle<()>) {
        self.listeners.push(task);
    }

    pub async fn close(mut self) -> Result<(), BackendError> {
        for task in self.listeners.drain(..) {
            task.abort();
        }
        self.browser
            .close()
            .await
            .map_err(|e| BackendError::Other(format!("error closing browser: {}", e)))?;
        if let Err(e) = self.handler_task.await {
            tracing::debug!("Browser handler join failed: {}", e);
        }

        if self.cleanup_user_data_dir
            && let Err(e) = std::fs::remove_dir_all(&self.user_data_dir)
        {
            tracing::warn!(
                "Failed to clean up user-data-dir {}: {}",
                self.user_data_dir.display(),
                e
            );
        }
        Ok(())
    }
}

async fn forward_console(page: &Page) -> Result<JoinHandle<()>, BackendError> {
    let mut events = page
        .event_listener::<EventConsoleApiCalled>()
        .await
        .map_err(|e| BackendError::Launch(format!("console subscription failed: {}", e)))?;

    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let args: Vec<String> = event
                .args
                .iter()
                .map(|arg| {
                    arg.value
                        .as_ref()
                        .map(|v| v.to_string())
                        .or_else(|| arg.description.clone())
                        .unwrap_or_else(|| "undefined".to_string())
                })
                .collect();
            tracing::info!("Browser console [{:?}]: {}", event.r#type, args.join(" "));
        }
    }))
}

// Alerts and confirms would block every later evaluation.
async fn accept_dialogs(page: &Page) -> Result<JoinHandle<()>, BackendError> {
    let mut events = page
        .event_listener::<EventJavascriptDialogOpening>()
        .await
        .map_err(|e| BackendError::Launch(format!("dialog subscription failed: {}", e)))?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            tracing::info!("Accepting dialog: {} ({:?})", event.message, event.r#type);
            if let Err(e) = page.execute(HandleJavaScriptDialogParams::new(true)).await {
                tracing::warn!("Failed to accept dialog: {}", e);
            }
        }
    }))
}

fn resolve_user_data_dir() -> Result<(PathBuf, bool), BackendError> {
    if let Ok(dir) = std::env::var("WAYMARK_USER_DATA_DIR") {
        let path = PathBuf::from(dir);
        std::fs::create_dir_all(&path)?;
        tracing::info!("Using user data dir from WAYMARK_USER_DATA_DIR: {}", path.display());
        return Ok((path, false));
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| BackendError::Launch(format!("system clock error: {}", e)))?
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "waymark-chromium-profile-{}-{}",
        std::process::id(),
        nanos
    ));
    std::fs::create_dir_all(&path)?;
    tracing::debug!("Using isolated user data dir: {}", path.display());
    Ok((path, true))
}
