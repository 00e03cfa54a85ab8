//! Tipping wizard: recipient, optional account prompt, then amount and terms.
//!
//! The wizard blocks on its last stage until the amount reaches the minimum
//! (5 PLN) and the terms box is ticked; `amount-validation` passes only when
//! the wizard moved past that stage.

use super::{mocks, onboarding};
use waymark_common::flow::{Action, Assertion, FlowStep};
use waymark_common::query::ElementQuery;
use waymark_common::scenario::ScenarioDefinition;

pub const DEFAULT_RECIPIENT: &str = "Pawłowi Polutkowi";
pub const MINIMUM_AMOUNT: u32 = 5;

pub fn modal_header() -> ElementQuery {
    ElementQuery::new("tipping modal header").by_text("Bramka Napiwkowa")
}

pub fn profile_avatar() -> ElementQuery {
    ElementQuery::new("author avatar")
        .by_css("img[alt*='avatar']")
        .by_attribute("alt", "avatar")
}

pub fn patron_button() -> ElementQuery {
    ElementQuery::new("become patron button")
        .by_role("button", Some("Zostań Patronem"))
        .by_text("Zostań Patronem")
}

pub fn recipient_option(name: &str) -> ElementQuery {
    ElementQuery::new(format!("recipient '{}'", name))
        .by_test_id(format!("recipient-{}", name))
        .by_text(name)
}

pub fn nobody_option() -> ElementQuery {
    ElementQuery::new("recipient 'nobody'").by_exact_text("Nikt")
}

pub fn enter_button() -> ElementQuery {
    ElementQuery::new("ENTER button")
        .by_role("button", Some("ENTER"))
        .by_exact_text("ENTER")
}

pub fn account_prompt() -> ElementQuery {
    ElementQuery::new("account creation prompt").by_text("Założyć konto Patrona?")
}

pub fn terms_link() -> ElementQuery {
    ElementQuery::new("terms link").by_text("regulamin i Politykę Prywatności")
}

pub fn terms_content() -> ElementQuery {
    ElementQuery::new("terms content").by_text("1. Postanowienia ogólne")
}

pub fn back_to_payment() -> ElementQuery {
    ElementQuery::new("back to payment button")
        .by_role("button", Some("Wróć do płatności"))
        .by_text("Wróć do płatności")
}

pub fn amount_input() -> ElementQuery {
    ElementQuery::new("amount input")
        .by_placeholder("0")
        .by_css("input[type='number']")
        .unique()
}

pub fn terms_checkbox() -> ElementQuery {
    ElementQuery::new("terms checkbox")
        .by_role("checkbox", None)
        .by_css("input[type='checkbox']")
}

/// How the wizard gets opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEntry {
    /// Avatar in the feed, then "Zostań Patronem" on the profile.
    Profile,
    /// The page opens the modal by itself.
    Forced,
}

#[derive(Debug, Clone)]
pub struct TippingWizard {
    entry_url: String,
    entry: ModalEntry,
    /// `None` picks "Nikt", which closes the wizard.
    recipient: Option<String>,
    amount: String,
    accept_terms: bool,
    inspect_terms: bool,
    logged_in: bool,
}

impl TippingWizard {
    pub fn new(entry_url: impl Into<String>) -> Self {
        Self {
            entry_url: entry_url.into(),
            entry: ModalEntry::Forced,
            recipient: Some(DEFAULT_RECIPIENT.to_string()),
            amount: "10".to_string(),
            accept_terms: false,
            inspect_terms: true,
            logged_in: false,
        }
    }

    pub fn entry(mut self, entry: ModalEntry) -> Self {
        self.entry = entry;
        self
    }

    pub fn recipient(mut self, recipient: Option<&str>) -> Self {
        self.recipient = recipient.map(str::to_string);
        self
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    pub fn accept_terms(mut self, accept: bool) -> Self {
        self.accept_terms = accept;
        self
    }

    pub fn inspect_terms(mut self, inspect: bool) -> Self {
        self.inspect_terms = inspect;
        self
    }

    /// Mock an authenticated session so the account prompt never shows.
    pub fn logged_in(mut self, logged_in: bool) -> Self {
        self.logged_in = logged_in;
        self
    }

    pub fn steps(&self) -> Vec<FlowStep> {
        let mut steps = Vec::new();

        match self.entry {
            ModalEntry::Profile => {
                steps.push(
                    FlowStep::new("open-profile", Action::Click(profile_avatar()))
                        .wait(1000)
                        .expect(Assertion::Visible(patron_button()))
                        .critical(),
                );
                steps.push(
                    FlowStep::new("open-tipping", Action::Click(patron_button()))
                        .expect(Assertion::Visible(modal_header()))
                        .critical()
                        .capture(),
                );
            }
            ModalEntry::Forced => {
                steps.push(
                    FlowStep::new("modal-open", Action::Observe)
                        .expect(Assertion::Visible(modal_header()))
                        .critical()
                        .capture(),
                );
            }
        }

        let Some(recipient) = &self.recipient else {
            steps.push(
                FlowStep::new("recipient-none", Action::Click(nobody_option()))
                    .when_visible(nobody_option())
                    .wait(500)
                    .expect(Assertion::Hidden(modal_header()))
                    .capture()
                    .exit(),
            );
            return steps;
        };

        steps.push(
            FlowStep::new("recipient", Action::Click(recipient_option(recipient)))
                .when_visible(recipient_option(recipient)),
        );
        steps.push(
            FlowStep::new("recipient-confirm", Action::Click(enter_button()))
                .when_visible(recipient_option(recipient))
                .wait(500),
        );
        steps.push(
            FlowStep::new("account", Action::Click(enter_button()))
                .when_visible(account_prompt())
                .wait(500),
        );

        if self.inspect_terms {
            steps.push(
                FlowStep::new("terms-view", Action::Click(terms_link()))
                    .wait(500)
                    .expect(Assertion::Visible(terms_content()))
                    .capture(),
            );
            steps.push(
                FlowStep::new("terms-return", Action::Click(back_to_payment()))
                    .when_visible(back_to_payment())
                    .wait(500)
                    .expect(Assertion::Visible(terms_link())),
            );
        }

        steps.push(FlowStep::new(
            "amount",
            Action::Fill {
                target: amount_input(),
                value: self.amount.clone(),
            },
        ));
        if self.accept_terms {
            steps.push(FlowStep::new("terms-accept", Action::Check(terms_checkbox())));
        }
        steps.push(
            FlowStep::new("amount-validation", Action::Click(enter_button()))
                .wait(500)
                .expect(Assertion::Hidden(terms_link()))
                .capture(),
        );
        steps.push(
            FlowStep::new("flow-complete", Action::Observe)
                .when_absent(terms_link())
                .capture(),
        );
        steps
    }

    pub fn scenario(&self) -> ScenarioDefinition {
        ScenarioDefinition {
            name: "tipping-wizard".to_string(),
            entry_url: self.entry_url.clone(),
            navigation_timeout_ms: None,
            mocks: if self.logged_in {
                vec![mocks::authenticated_session()]
            } else {
                Vec::new()
            },
            onboarding: Some(onboarding::language_preloader()),
            settle_ms: Some(3000),
            budget_ms: None,
            steps: self.steps(),
        }
    }
}
