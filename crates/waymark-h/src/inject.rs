use chromiumoxide::Page;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use serde::de::DeserializeOwned;
use std::time::Duration;
use waymark_common::BackendError;

const LOCATOR_JS: &str = include_str!("locator.js");

/// Upper bound on a single evaluation; a blocking dialog would otherwise hang it.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries while the execution context is being replaced by a navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

async fn evaluate_once(page: &Page, expression: &str) -> Result<serde_json::Value, EvalError> {
    let params = EvaluateParams::builder()
        .expression(expression)
        .return_by_value(true)
        .build()
        .map_err(EvalError::Other)?;
    match tokio::time::timeout(EVAL_TIMEOUT, page.evaluate_expression(params)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err = e.to_string();
            if is_context_error(&err) {
                Err(EvalError::Context(err))
            } else {
                Err(EvalError::Other(err))
            }
        }
        Ok(Ok(remote)) => Ok(remote.into_value().unwrap_or(serde_json::Value::Null)),
    }
}

/// Evaluate `expression` with the locator script installed, retrying across
/// context teardown.
pub(crate) async fn call<T: DeserializeOwned>(
    page: &Page,
    expression: &str,
) -> Result<T, BackendError> {
    let guarded = format!("{}; {}", LOCATOR_JS.trim_end(), expression);
    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match evaluate_once(page, &guarded).await {
            Ok(value) => return Ok(serde_json::from_value(value)?),
            Err(EvalError::Timeout) => {
                return Err(BackendError::Script(
                    "evaluation timed out, possibly blocked by a dialog".into(),
                ));
            }
            Err(EvalError::Context(err)) => {
                tracing::debug!(
                    "Context error (attempt {}/{}), retrying",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err)) => return Err(BackendError::Script(err)),
        }
    }

    Err(BackendError::Script(last_error.unwrap_or_else(|| {
        "execution context unavailable".to_string()
    })))
}
