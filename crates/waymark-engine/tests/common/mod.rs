#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use waymark_engine::backend::{Backend, BackendError, ElementHandle, NavigationResult};
use waymark_engine::mock::MockRouter;
use waymark_engine::query::Strategy;

pub const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

pub fn handle(id: u64, label: &str) -> ElementHandle {
    ElementHandle::new(id, label)
}

// =============================================================================
// Static page: strategy -> fixed matches
// =============================================================================

#[derive(Default)]
pub struct StaticState {
    /// Keyed by the strategy's display form.
    pub matches: HashMap<String, Vec<ElementHandle>>,
    /// Strategy -> number of probes before its matches show up.
    pub appear_after: HashMap<String, usize>,
    /// Strategies whose probe errors out.
    pub erroring: Vec<String>,
    /// Clicking element `id` makes these matches appear.
    pub reveal_on_click: HashMap<u64, (String, Vec<ElementHandle>)>,
    /// Clicking element `id` removes all matches of this strategy.
    pub hide_on_click: HashMap<u64, String>,
    pub text: String,
    pub probes: HashMap<String, usize>,
    pub clicks: Vec<u64>,
    pub fills: Vec<(u64, String)>,
    pub navigations: Vec<String>,
    pub router: Option<MockRouter>,
    pub unreachable: bool,
    pub fail_launch: bool,
    pub fail_screenshot: bool,
    pub fail_text: bool,
    pub launched: bool,
    pub closed: bool,
}

#[derive(Clone, Default)]
pub struct StaticPage {
    pub state: Arc<Mutex<StaticState>>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, strategy: &Strategy, elements: Vec<ElementHandle>) -> Self {
        self.state
            .lock()
            .unwrap()
            .matches
            .insert(strategy.to_string(), elements);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.state.lock().unwrap().text = text.to_string();
        self
    }

    pub fn probes(&self, strategy: &Strategy) -> usize {
        self.state
            .lock()
            .unwrap()
            .probes
            .get(&strategy.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn total_probes(&self) -> usize {
        self.state.lock().unwrap().probes.values().sum()
    }
}

#[async_trait]
impl Backend for StaticPage {
    async fn launch(&mut self) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_launch {
            return Err(BackendError::Launch("no browser binary".into()));
        }
        state.launched = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.state.lock().unwrap().launched
    }

    async fn navigate(
        &mut self,
        url: &str,
        _timeout: Duration,
    ) -> Result<NavigationResult, BackendError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(BackendError::Navigation("net::ERR_CONNECTION_REFUSED".into()));
        }
        state.navigations.push(url.to_string());
        Ok(NavigationResult {
            url: url.to_string(),
            title: "Test Page".to_string(),
            status: Some(200),
        })
    }

    async fn find_visible(
        &mut self,
        strategy: &Strategy,
    ) -> Result<Vec<ElementHandle>, BackendError> {
        let key = strategy.to_string();
        let mut state = self.state.lock().unwrap();
        let seen = {
            let count = state.probes.entry(key.clone()).or_insert(0);
            *count += 1;
            *count
        };
        if state.erroring.contains(&key) {
            return Err(BackendError::Script("Execution context was destroyed".into()));
        }
        if let Some(after) = state.appear_after.get(&key)
            && seen <= *after
        {
            return Ok(vec![]);
        }
        Ok(state.matches.get(&key).cloned().unwrap_or_default())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(element.id);
        if let Some((key, elements)) = state.reveal_on_click.get(&element.id).cloned() {
            state.matches.insert(key, elements);
        }
        if let Some(key) = state.hide_on_click.get(&element.id).cloned() {
            state.matches.remove(&key);
        }
        Ok(())
    }

    async fn fill(&mut self, element: &ElementHandle, value: &str) -> Result<(), BackendError> {
        self.state
            .lock()
            .unwrap()
            .fills
            .push((element.id, value.to_string()));
        Ok(())
    }

    async fn is_visible(&mut self, element: &ElementHandle) -> Result<bool, BackendError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .matches
            .values()
            .any(|els| els.iter().any(|e| e.id == element.id)))
    }

    async fn intercept(&mut self, router: MockRouter) -> Result<(), BackendError> {
        self.state.lock().unwrap().router = Some(router);
        Ok(())
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        if self.state.lock().unwrap().fail_screenshot {
            return Err(BackendError::Other("Screenshot failed: target closed".into()));
        }
        Ok(PNG_MAGIC.to_vec())
    }

    async fn text_content(&mut self) -> Result<String, BackendError> {
        let state = self.state.lock().unwrap();
        if state.fail_text {
            return Err(BackendError::Script("evaluation timed out".into()));
        }
        Ok(state.text.clone())
    }
}

// =============================================================================
// Wizard page: a small model of the tipping application
// =============================================================================

pub const SESSION_URL: &str = "http://127.0.0.1:3000/api/auth/session";
pub const TERMS_LINK_TEXT: &str = "Akceptuję regulamin i Politykę Prywatności";
pub const VALIDATION_TOAST: &str = "Minimalna kwota to 5 PLN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preloader,
    Feed,
    Profile,
    Recipient,
    Account,
    Amount,
    Terms,
    Done,
}

#[derive(Debug, Clone)]
struct Node {
    id: u64,
    text: String,
    role: Option<&'static str>,
    css: Vec<&'static str>,
    placeholder: Option<&'static str>,
    attrs: Vec<(&'static str, &'static str)>,
    icon: Option<&'static str>,
}

impl Node {
    fn new(id: u64, text: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
            role: None,
            css: vec![],
            placeholder: None,
            attrs: vec![],
            icon: None,
        }
    }

    fn role(mut self, role: &'static str) -> Self {
        self.role = Some(role);
        self
    }

    fn css(mut self, selector: &'static str) -> Self {
        self.css.push(selector);
        self
    }

    fn matches(&self, strategy: &Strategy) -> bool {
        match strategy {
            Strategy::TestId { .. } => false,
            Strategy::Role { role, name } => {
                self.role == Some(role.as_str())
                    && name.as_ref().is_none_or(|n| self.text.contains(n.as_str()))
            }
            Strategy::Text { text, exact: true } => self.text == *text,
            Strategy::Text { text, exact: false } => {
                !self.text.is_empty() && self.text.contains(text.as_str())
            }
            Strategy::Css { selector } => self.css.contains(&selector.as_str()),
            Strategy::IconClass { class } => self.icon == Some(class.as_str()),
            Strategy::Attribute { name, contains } => self
                .attrs
                .iter()
                .any(|(n, v)| n == name && v.contains(contains.as_str())),
            Strategy::Placeholder { value } => self.placeholder == Some(value.as_str()),
        }
    }
}

const POLSKI: u64 = 1;
const OVERLAY: u64 = 2;
const AVATAR: u64 = 3;
const PATRON: u64 = 4;
const HEADER: u64 = 10;
const NOBODY: u64 = 12;
const ENTER: u64 = 20;
const ACCOUNT_PROMPT: u64 = 30;
const TERMS_LINK: u64 = 40;
const AMOUNT: u64 = 41;
const CHECKBOX: u64 = 42;
const TERMS_TEXT: u64 = 50;
const BACK: u64 = 51;
const THANKS: u64 = 60;
const RECIPIENT_BASE: u64 = 100;

pub struct WizardState {
    pub stage: Stage,
    pub preloader: bool,
    pub forced: bool,
    pub recipients: Vec<&'static str>,
    pub selected: Option<&'static str>,
    pub logged_in: bool,
    pub amount: String,
    pub terms_checked: bool,
    pub toast: Option<&'static str>,
    pub modal_closed: bool,
    pub reachable: bool,
    pub launched: bool,
    pub closed: bool,
    pub router: Option<MockRouter>,
    pub clicks: Vec<u64>,
}

#[derive(Clone)]
pub struct WizardPage {
    pub state: Arc<Mutex<WizardState>>,
}

impl WizardPage {
    /// Two recipients, preloader shown, modal opened by the page itself.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(WizardState {
                stage: Stage::Preloader,
                preloader: true,
                forced: true,
                recipients: vec!["Pawłowi Polutkowi", "Zordonowi"],
                selected: None,
                logged_in: false,
                amount: String::new(),
                terms_checked: false,
                toast: None,
                modal_closed: false,
                reachable: true,
                launched: false,
                closed: false,
                router: None,
                clicks: vec![],
            })),
        }
    }

    pub fn without_preloader(self) -> Self {
        self.state.lock().unwrap().preloader = false;
        self
    }

    pub fn via_profile(self) -> Self {
        self.state.lock().unwrap().forced = false;
        self
    }

    pub fn single_recipient(self) -> Self {
        self.state.lock().unwrap().recipients = vec!["Pawłowi Polutkowi"];
        self
    }

    pub fn unreachable(self) -> Self {
        self.state.lock().unwrap().reachable = false;
        self
    }

    pub fn stage(&self) -> Stage {
        self.state.lock().unwrap().stage
    }

    /// Texts of every element currently rendered.
    pub fn visible_texts(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        nodes(&state).into_iter().map(|n| n.text).collect()
    }
}

fn modal_start(state: &WizardState) -> Stage {
    if state.recipients.len() > 1 {
        Stage::Recipient
    } else if state.logged_in {
        Stage::Amount
    } else {
        Stage::Account
    }
}

fn landing(state: &WizardState) -> Stage {
    if state.forced {
        modal_start(state)
    } else {
        Stage::Feed
    }
}

fn nodes(state: &WizardState) -> Vec<Node> {
    let header = Node::new(HEADER, "Bramka Napiwkowa");
    let enter = Node::new(ENTER, "ENTER").role("button");
    let avatar = {
        let mut n = Node::new(AVATAR, "").css("img[alt*='avatar']");
        n.attrs.push(("alt", "User avatar"));
        n
    };

    match state.stage {
        Stage::Preloader => vec![
            Node::new(OVERLAY, "").css(".absolute.inset-0.bg-black"),
            Node::new(POLSKI, "Polski").role("button"),
            Node::new(POLSKI + 100, "English").role("button"),
        ],
        Stage::Feed => vec![avatar],
        Stage::Profile => vec![avatar, Node::new(PATRON, "Zostań Patronem").role("button")],
        Stage::Recipient => {
            let mut list = vec![header];
            for (i, name) in state.recipients.iter().enumerate() {
                list.push(Node::new(RECIPIENT_BASE + i as u64, name));
            }
            list.push(Node::new(NOBODY, "Nikt"));
            list.push(enter);
            list
        }
        Stage::Account => vec![
            header,
            Node::new(ACCOUNT_PROMPT, "Założyć konto Patrona?"),
            enter,
        ],
        Stage::Amount => {
            let mut amount = Node::new(AMOUNT, "").css("input[type='number']");
            amount.placeholder = Some("0");
            let mut list = vec![
                header,
                amount,
                Node::new(CHECKBOX, "").role("checkbox").css("input[type='checkbox']"),
                Node::new(TERMS_LINK, TERMS_LINK_TEXT),
                enter,
            ];
            if let Some(toast) = state.toast {
                list.push(Node::new(999, toast));
            }
            list
        }
        Stage::Terms => vec![
            header,
            Node::new(TERMS_TEXT, "1. Postanowienia ogólne"),
            Node::new(BACK, "Wróć do płatności").role("button"),
        ],
        Stage::Done => vec![header, Node::new(THANKS, "Dziękujemy! Przekierowanie do płatności")],
    }
}

fn press(state: &mut WizardState, id: u64) -> Result<(), BackendError> {
    let visible = nodes(state).iter().any(|n| n.id == id);
    if !visible {
        return Err(BackendError::StaleElement { id });
    }
    state.clicks.push(id);

    match (state.stage, id) {
        (Stage::Preloader, POLSKI) => state.stage = landing(state),
        (Stage::Feed, AVATAR) => state.stage = Stage::Profile,
        (Stage::Profile, PATRON) => state.stage = modal_start(state),
        (Stage::Recipient, NOBODY) => {
            state.modal_closed = true;
            state.stage = Stage::Feed;
        }
        (Stage::Recipient, id) if id >= RECIPIENT_BASE => {
            state.selected = state
                .recipients
                .get((id - RECIPIENT_BASE) as usize)
                .copied();
        }
        (Stage::Recipient, ENTER) if state.selected.is_some() => {
            state.stage = if state.logged_in {
                Stage::Amount
            } else {
                Stage::Account
            };
        }
        (Stage::Account, ENTER) => state.stage = Stage::Amount,
        (Stage::Amount, TERMS_LINK) => state.stage = Stage::Terms,
        (Stage::Terms, BACK) => state.stage = Stage::Amount,
        (Stage::Amount, CHECKBOX) => state.terms_checked = !state.terms_checked,
        (Stage::Amount, ENTER) => {
            let amount: f64 = state.amount.trim().parse().unwrap_or(0.0);
            if amount >= 5.0 && state.terms_checked {
                state.toast = None;
                state.stage = Stage::Done;
            } else {
                state.toast = Some(VALIDATION_TOAST);
            }
        }
        _ => {}
    }
    Ok(())
}

#[async_trait]
impl Backend for WizardPage {
    async fn launch(&mut self) -> Result<(), BackendError> {
        self.state.lock().unwrap().launched = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.state.lock().unwrap().launched
    }

    async fn navigate(
        &mut self,
        url: &str,
        _timeout: Duration,
    ) -> Result<NavigationResult, BackendError> {
        let mut state = self.state.lock().unwrap();
        if !state.reachable {
            return Err(BackendError::Navigation(format!(
                "net::ERR_CONNECTION_REFUSED at {}",
                url
            )));
        }
        // The client asks for its session on boot.
        state.logged_in = state
            .router
            .as_ref()
            .and_then(|r| r.respond(SESSION_URL))
            .is_some_and(|resp| resp.status == 200 && resp.body.contains("\"user\""));
        state.stage = if state.preloader {
            Stage::Preloader
        } else {
            landing(&state)
        };
        Ok(NavigationResult {
            url: url.to_string(),
            title: "Ting Tong".to_string(),
            status: Some(200),
        })
    }

    async fn find_visible(
        &mut self,
        strategy: &Strategy,
    ) -> Result<Vec<ElementHandle>, BackendError> {
        let state = self.state.lock().unwrap();
        Ok(nodes(&state)
            .into_iter()
            .filter(|n| n.matches(strategy))
            .map(|n| ElementHandle::new(n.id, n.text))
            .collect())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        press(&mut self.state.lock().unwrap(), element.id)
    }

    async fn fill(&mut self, element: &ElementHandle, value: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if element.id != AMOUNT || state.stage != Stage::Amount {
            return Err(BackendError::Interaction(format!(
                "element {} is not an input",
                element.id
            )));
        }
        state.amount = value.to_string();
        Ok(())
    }

    async fn check(&mut self, element: &ElementHandle) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if element.id == CHECKBOX && state.terms_checked {
            return Ok(());
        }
        press(&mut state, element.id)
    }

    async fn is_visible(&mut self, element: &ElementHandle) -> Result<bool, BackendError> {
        let state = self.state.lock().unwrap();
        Ok(nodes(&state).iter().any(|n| n.id == element.id))
    }

    async fn intercept(&mut self, router: MockRouter) -> Result<(), BackendError> {
        self.state.lock().unwrap().router = Some(router);
        Ok(())
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        Ok(PNG_MAGIC.to_vec())
    }

    async fn text_content(&mut self) -> Result<String, BackendError> {
        let state = self.state.lock().unwrap();
        Ok(nodes(&state)
            .into_iter()
            .map(|n| n.text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
