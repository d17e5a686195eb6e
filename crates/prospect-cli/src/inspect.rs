//! `inspect` subcommand: audit one website and print its record.

use prospect_audit::Auditor;
use prospect_core::{AppConfig, BusinessCandidate};

pub(crate) async fn run(config: &AppConfig, url: &str, name: &str) -> anyhow::Result<()> {
    let auditor = Auditor::new(config.audit_config())?;
    let candidate = BusinessCandidate::new(name, "Unknown").with_website(url);

    let audit = auditor.audit_business(candidate).await;
    for error in &audit.errors {
        tracing::warn!(url = %url, error = %error, "audit step degraded");
    }

    println!("{}", serde_json::to_string_pretty(&audit.business)?);
    Ok(())
}
