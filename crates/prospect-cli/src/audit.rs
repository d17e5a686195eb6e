//! `audit` subcommand: discovery, the audit run, and report output.

use std::fs;
use std::future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use prospect_audit::{Auditor, CancelSignal};
use prospect_core::{AppConfig, BusinessCandidate, Report};
use prospect_places::{DiscoveryRequest, PlacesClient};
use tokio::sync::mpsc;

#[derive(Debug, Args)]
pub(crate) struct AuditArgs {
    /// Industry to search for, e.g. "bakeries"
    #[arg(long)]
    pub industry: String,
    /// City or region to search in
    #[arg(long)]
    pub location: String,
    /// Maximum number of businesses to discover
    #[arg(long, default_value_t = 50)]
    pub max_results: usize,
    /// Skip businesses without a listed website
    #[arg(long)]
    pub website_required: bool,
    /// Read candidates from a JSON array instead of the Places API
    #[arg(long)]
    pub candidates: Option<PathBuf>,
    /// Write the report here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Stop starting new audits after this many seconds
    #[arg(long)]
    pub time_budget_secs: Option<u64>,
}

pub(crate) async fn run(config: &AppConfig, args: AuditArgs) -> anyhow::Result<()> {
    let candidates = match &args.candidates {
        Some(path) => load_candidates(path)?,
        None => discover(config, &args).await?,
    };
    if candidates.is_empty() {
        tracing::warn!(
            industry = %args.industry,
            location = %args.location,
            "no businesses found; writing empty report"
        );
    }

    let auditor = Auditor::new(config.audit_config())?;
    let cancel = CancelSignal::new();
    let watcher = tokio::spawn(cancel_on_interrupt(
        cancel.clone(),
        args.time_budget_secs.map(Duration::from_secs),
    ));

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(crate::progress::print_events(rx));

    let outcome = auditor
        .run(&args.industry, &args.location, candidates, &cancel, Some(&tx))
        .await;
    drop(tx);
    watcher.abort();
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "progress printer stopped early");
    }

    if outcome.cancelled {
        tracing::warn!(
            audited = outcome.report.businesses.len(),
            "run cancelled; writing partial report"
        );
    }
    write_report(&outcome.report, args.output.as_deref())
}

async fn discover(config: &AppConfig, args: &AuditArgs) -> anyhow::Result<Vec<BusinessCandidate>> {
    let api_key = config.require_places_api_key()?;
    let client = PlacesClient::new(api_key, config.request_timeout_secs)?;
    let request = DiscoveryRequest {
        industry: args.industry.clone(),
        location: args.location.clone(),
        max_results: args.max_results,
        website_required: args.website_required,
        page_delay: Duration::from_millis(config.places_page_delay_ms),
    };
    let candidates = client
        .discover(&request)
        .await
        .with_context(|| format!("discovery failed for \"{}\"", request.query()))?;
    Ok(candidates)
}

/// Fires `cancel` on Ctrl-C or once `budget` elapses, whichever comes first.
async fn cancel_on_interrupt(cancel: CancelSignal, budget: Option<Duration>) {
    let deadline = async {
        match budget {
            Some(budget) => tokio::time::sleep(budget).await,
            None => future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "failed to install Ctrl-C handler");
                return;
            }
            tracing::info!("interrupt received; finishing in-flight audits");
        }
        () = deadline => {
            tracing::info!("time budget exhausted; finishing in-flight audits");
        }
    }
    cancel.cancel();
}

pub(crate) fn load_candidates(path: &Path) -> anyhow::Result<Vec<BusinessCandidate>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read candidates from {}", path.display()))?;
    parse_candidates(&raw).with_context(|| format!("invalid candidates file {}", path.display()))
}

pub(crate) fn parse_candidates(raw: &str) -> anyhow::Result<Vec<BusinessCandidate>> {
    let candidates: Vec<BusinessCandidate> = serde_json::from_str(raw)?;
    Ok(candidates)
}

fn write_report(report: &Report, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
