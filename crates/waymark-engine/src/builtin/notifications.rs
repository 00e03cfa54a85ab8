use super::{mocks, onboarding};
use waymark_common::flow::{Action, Assertion, FlowStep};
use waymark_common::query::ElementQuery;
use waymark_common::scenario::ScenarioDefinition;

pub const DEFAULT_NOTIFICATION: &str = "Witaj w Zordon! To jest test powiadomienia systemowego.";

pub fn bell_button() -> ElementQuery {
    ElementQuery::new("notification bell")
        .by_role("button", Some("Powiadomienia"))
        .by_attribute("aria-label", "Powiadomienia")
        .by_icon("lucide-bell")
}

/// Signed-in user with one system notification opens the notification panel.
#[derive(Debug, Clone)]
pub struct SystemNotification {
    entry_url: String,
    text: String,
}

impl SystemNotification {
    pub fn new(entry_url: impl Into<String>) -> Self {
        Self {
            entry_url: entry_url.into(),
            text: DEFAULT_NOTIFICATION.to_string(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn scenario(&self) -> ScenarioDefinition {
        ScenarioDefinition {
            name: "system-notification".to_string(),
            entry_url: self.entry_url.clone(),
            navigation_timeout_ms: None,
            mocks: vec![
                mocks::system_notification(&self.text),
                mocks::authenticated_session(),
            ],
            onboarding: Some(onboarding::language_preloader()),
            settle_ms: Some(1000),
            budget_ms: None,
            steps: vec![
                FlowStep::new("open-notifications", Action::Click(bell_button()))
                    .wait(1000)
                    .expect(Assertion::TextPresent(self.text.clone()))
                    .critical()
                    .capture(),
            ],
        }
    }
}
