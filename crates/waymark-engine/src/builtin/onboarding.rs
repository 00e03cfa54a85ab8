use waymark_common::query::ElementQuery;
use waymark_common::scenario::OnboardingDismissal;

/// Language picker shown on first load. Choosing Polish fades out a black
/// full-screen overlay.
pub fn language_preloader() -> OnboardingDismissal {
    OnboardingDismissal {
        trigger: ElementQuery::new("polish language choice")
            .by_role("button", Some("Polski"))
            .by_text("Polski"),
        wait_hidden: Some(
            ElementQuery::new("preloader overlay").by_css(".absolute.inset-0.bg-black"),
        ),
        timeout_ms: Some(5000),
    }
}
