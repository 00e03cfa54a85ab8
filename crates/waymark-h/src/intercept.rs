use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FulfillRequestParams, HeaderEntry,
    RequestPattern, RequestStage,
};
use futures::StreamExt;
use tokio::task::JoinHandle;
use waymark_common::BackendError;
use waymark_common::mock::ResponseTemplate;
use waymark_engine::mock::MockRouter;

/// Pause every request at the Fetch domain and answer it from `router`,
/// letting unmatched requests continue to the network.
pub(crate) async fn install(page: &Page, router: MockRouter) -> Result<JoinHandle<()>, BackendError> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| BackendError::Other(format!("fetch subscription failed: {}", e)))?;

    let responder = page.clone();
    let task = tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let url = &event.request.url;
            let mocked = router.respond(url).and_then(|template| {
                fulfil(&event, &template)
                    .inspect_err(|e| tracing::warn!("Cannot mock {}: {}", url, e))
                    .ok()
            });
            let outcome = match mocked {
                Some(params) => responder.execute(params).await.map(|_| ()),
                None => responder
                    .execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ()),
            };
            if let Err(e) = outcome {
                tracing::warn!("Failed to release paused request {}: {}", url, e);
            }
        }
    });

    let enable = EnableParams::builder()
        .pattern(
            RequestPattern::builder()
                .url_pattern("*")
                .request_stage(RequestStage::Request)
                .build(),
        )
        .build();
    if let Err(e) = page.execute(enable).await {
        task.abort();
        return Err(BackendError::Other(format!("Fetch.enable failed: {}", e)));
    }

    Ok(task)
}

fn fulfil(
    event: &EventRequestPaused,
    template: &ResponseTemplate,
) -> Result<FulfillRequestParams, String> {
    let header = HeaderEntry::new("Content-Type", template.content_type.clone());
    FulfillRequestParams::builder()
        .request_id(event.request_id.clone())
        .response_code(template.status as i64)
        .response_header(header)
        .body(STANDARD.encode(template.body.as_bytes()))
        .build()
}
