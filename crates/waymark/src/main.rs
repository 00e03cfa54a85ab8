mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use tracing_subscriber::EnvFilter;
use waymark_engine::config::{ConfigLoader, WaymarkConfig};
use waymark_engine::orchestrator::ScenarioRunner;
use waymark_h::HeadlessBackend;

async fn load_config(args: &Args) -> anyhow::Result<WaymarkConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };
    if args.visible {
        config.browser.visible = true;
    }
    if let Some(dir) = &args.evidence_dir {
        config.evidence.dir = dir.clone();
    }
    if args.no_evidence {
        config.evidence.enabled = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the summary; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args).await?;
    let scenario = args.command.scenario().context("invalid scenario")?;

    let runner = ScenarioRunner::new(&config);
    let cancel = runner.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping at the next step");
            cancel.cancel();
        }
    });

    let backend = HeadlessBackend::new(config.browser.clone());
    let report = runner.run(backend, &scenario).await;

    println!("{}", report.summary());
    if let Some(path) = &args.report {
        let json = report.to_json_pretty()?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing report {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    let code = report.status.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
