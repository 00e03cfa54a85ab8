use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use waymark_engine::builtin::{ModalEntry, SystemNotification, TippingWizard};
use waymark_engine::builtin::notifications::DEFAULT_NOTIFICATION;
use waymark_engine::builtin::tipping::DEFAULT_RECIPIENT;
use waymark_engine::scenario::{ScenarioDefinition, ScenarioError};

pub const DEFAULT_URL: &str = "http://localhost:3000";

#[derive(Parser, Debug)]
#[command(name = "waymark", version, about = "Resilient UI scenario runner")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ./waymark.yaml, then ~/.waymark/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write the JSON run report to this path
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    /// Launch the browser with a window
    #[arg(long, global = true)]
    pub visible: bool,

    /// Directory for screenshots (overrides config)
    #[arg(long, global = true)]
    pub evidence_dir: Option<PathBuf>,

    /// Disable screenshot capture
    #[arg(long, global = true)]
    pub no_evidence: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scenario file (YAML, or JSON by extension)
    Run { path: PathBuf },
    /// Walk the tipping wizard
    Tipping(TippingArgs),
    /// Check a mocked system notification reaches the bell panel
    Notifications {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        /// Notification text to mock and expect
        #[arg(long, default_value = DEFAULT_NOTIFICATION)]
        text: String,
    },
}

#[derive(ClapArgs, Debug)]
pub struct TippingArgs {
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,
    #[arg(long, default_value = DEFAULT_RECIPIENT, conflicts_with = "nobody")]
    pub recipient: String,
    /// Pick "Nikt" and expect the wizard to close
    #[arg(long)]
    pub nobody: bool,
    #[arg(long, default_value = "10")]
    pub amount: String,
    /// Tick the terms checkbox before continuing
    #[arg(long)]
    pub accept_terms: bool,
    /// Skip the terms view round trip
    #[arg(long)]
    pub skip_terms_view: bool,
    /// Open the wizard from the profile avatar instead of expecting it open
    #[arg(long)]
    pub profile: bool,
    /// Mock an authenticated session
    #[arg(long)]
    pub logged_in: bool,
}

impl Command {
    pub fn scenario(&self) -> Result<ScenarioDefinition, ScenarioError> {
        match self {
            Command::Run { path } => ScenarioDefinition::from_path(path),
            Command::Tipping(t) => {
                let wizard = TippingWizard::new(&t.url)
                    .entry(if t.profile {
                        ModalEntry::Profile
                    } else {
                        ModalEntry::Forced
                    })
                    .recipient((!t.nobody).then_some(t.recipient.as_str()))
                    .amount(&t.amount)
                    .accept_terms(t.accept_terms)
                    .inspect_terms(!t.skip_terms_view)
                    .logged_in(t.logged_in);
                let scenario = wizard.scenario();
                scenario.validate()?;
                Ok(scenario)
            }
            Command::Notifications { url, text } => {
                let scenario = SystemNotification::new(url).text(text).scenario();
                scenario.validate()?;
                Ok(scenario)
            }
        }
    }
}
