//! Real-browser checks. Need a local Chromium, so they only run with
//! `cargo test -p waymark-h -- --ignored`.

use serial_test::serial;
use std::time::Duration;
use waymark_common::flow::{Action, Assertion, FlowStep};
use waymark_common::mock::{MockRule, ResponseTemplate};
use waymark_common::query::{ElementQuery, Strategy};
use waymark_common::report::{CheckpointStatus, RunStatus};
use waymark_common::scenario::ScenarioDefinition;
use waymark_engine::backend::Backend;
use waymark_engine::config::WaymarkConfig;
use waymark_engine::mock::MockRegistry;
use waymark_engine::orchestrator::ScenarioRunner;
use waymark_h::HeadlessBackend;

const PAGE: &str = "data:text/html,<html><head><title>Waymark</title></head><body>\
<div data-testid='hidden' style='display:none'>ghost</div>\
<button aria-label='Powiadomienia' onclick=\"document.getElementById('out').textContent='Opened'\">\
<i class='lucide-bell'></i></button>\
<input placeholder='0' type='number' oninput=\"document.getElementById('out').textContent='Amount '+this.value\">\
<p id='out'>Idle</p></body></html>";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .ok();
}

#[tokio::test]
#[serial]
#[ignore]
async fn locates_clicks_and_fills_in_chromium() {
    init_tracing();
    let mut backend = HeadlessBackend::default();
    if let Err(e) = backend.launch().await {
        eprintln!("Skipping: browser not available: {}", e);
        return;
    }

    let nav = backend
        .navigate(PAGE, Duration::from_secs(30))
        .await
        .expect("Navigation failed");
    assert_eq!(nav.title, "Waymark");

    let hidden = backend
        .find_visible(&Strategy::TestId {
            value: "hidden".into(),
        })
        .await
        .unwrap();
    assert!(hidden.is_empty(), "display:none elements are not visible");

    let bell = backend
        .find_visible(&Strategy::IconClass {
            class: "lucide-bell".into(),
        })
        .await
        .unwrap();
    assert_eq!(bell.len(), 1);
    assert!(backend.is_visible(&bell[0]).await.unwrap());
    backend.click(&bell[0]).await.unwrap();
    assert!(backend.text_content().await.unwrap().contains("Opened"));

    let amount = backend
        .find_visible(&Strategy::Placeholder { value: "0".into() })
        .await
        .unwrap();
    backend.fill(&amount[0], "10").await.unwrap();
    assert!(backend.text_content().await.unwrap().contains("Amount 10"));

    let png = backend.screenshot().await.unwrap();
    assert_eq!(&png[..4], b"\x89PNG");

    backend.close().await.expect("Failed to close");
}

#[tokio::test]
#[serial]
#[ignore]
async fn runner_drives_a_real_page() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let mut config = WaymarkConfig::default();
    config.evidence.dir = dir.path().to_path_buf();
    let scenario = ScenarioDefinition {
        name: "smoke".into(),
        entry_url: PAGE.into(),
        navigation_timeout_ms: Some(30_000),
        mocks: vec![],
        onboarding: None,
        settle_ms: None,
        budget_ms: None,
        steps: vec![
            FlowStep::new(
                "open-bell",
                Action::Click(ElementQuery::new("bell").by_role("button", Some("Powiadomienia"))),
            )
            .expect(Assertion::TextPresent("Opened".into()))
            .critical()
            .capture(),
        ],
    };

    let backend = HeadlessBackend::new(config.browser.clone());
    let report = ScenarioRunner::new(&config).run(backend, &scenario).await;

    if report.status == RunStatus::NavigationFailed {
        eprintln!("Skipping: browser not available");
        return;
    }
    assert_eq!(report.status, RunStatus::Completed);
    let step = report.checkpoint("open-bell").unwrap();
    assert_eq!(step.status, CheckpointStatus::Passed);
    assert!(step.evidence.as_ref().is_some_and(|p| p.exists()));
}

const CHECKBOXES: &str = "data:text/html,<html><body>\
<label><input type='checkbox' id='terms' checked> terms</label>\
<label><input type='checkbox' id='news'> news</label></body></html>";

#[tokio::test]
#[serial]
#[ignore]
async fn check_leaves_ticked_boxes_alone() {
    init_tracing();
    let mut backend = HeadlessBackend::default();
    if let Err(e) = backend.launch().await {
        eprintln!("Skipping: browser not available: {}", e);
        return;
    }
    backend
        .navigate(CHECKBOXES, Duration::from_secs(30))
        .await
        .expect("Navigation failed");

    let boxes = backend
        .find_visible(&Strategy::Css {
            selector: "input[type='checkbox']".into(),
        })
        .await
        .unwrap();
    assert_eq!(boxes.len(), 2);
    for b in &boxes {
        backend.check(b).await.unwrap();
    }
    // Checking twice must not untick.
    backend.check(&boxes[0]).await.unwrap();

    let ticked = backend
        .find_visible(&Strategy::Css {
            selector: "input:checked".into(),
        })
        .await
        .unwrap();
    assert_eq!(ticked.len(), 2);

    backend.close().await.expect("Failed to close");
}

const MOCKED_ORIGIN: &str = "http://waymark.test/index.html";

const MOCKED_PAGE: &str = "<html><head><title>Mocked</title></head><body>\
<p id='out'>waiting</p><p id='other'>pending</p><script>\
fetch('/api/ping').then(r => r.json()).then(j => { document.getElementById('out').textContent = 'pong ' + j.ok; });\
fetch('/api/unmocked').then(() => 'reached', () => 'passed through').then(t => { document.getElementById('other').textContent = t; });\
</script></body></html>";

#[tokio::test]
#[serial]
#[ignore]
async fn fetch_requests_are_answered_from_mocks() {
    init_tracing();
    let mut backend = HeadlessBackend::default();
    if let Err(e) = backend.launch().await {
        eprintln!("Skipping: browser not available: {}", e);
        return;
    }

    let registry = MockRegistry::from_rules(&[
        MockRule::new(
            "**/index.html",
            ResponseTemplate {
                status: 200,
                content_type: "text/html; charset=utf-8".into(),
                body: MOCKED_PAGE.into(),
            },
        ),
        MockRule::new("**/api/ping", ResponseTemplate::json(&serde_json::json!({ "ok": "yes" }))),
    ])
    .unwrap();
    let router = registry.into_router();
    backend.intercept(router.clone()).await.unwrap();

    let nav = backend
        .navigate(MOCKED_ORIGIN, Duration::from_secs(30))
        .await
        .expect("Navigation failed");
    assert_eq!(nav.title, "Mocked");
    assert_eq!(nav.status, Some(200));

    let mut text = String::new();
    for _ in 0..50 {
        text = backend.text_content().await.unwrap();
        if text.contains("pong yes") && !text.contains("pending") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(text.contains("pong yes"), "page text: {}", text);
    // The unmatched request went on to the (unresolvable) network.
    assert!(text.contains("passed through"), "page text: {}", text);
    assert_eq!(router.hits("**/index.html"), 1);
    assert_eq!(router.hits("**/api/ping"), 1);

    backend.close().await.expect("Failed to close");
}
