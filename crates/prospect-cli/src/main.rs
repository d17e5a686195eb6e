mod audit;
mod inspect;
mod progress;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::audit::AuditArgs;

#[derive(Debug, Parser)]
#[command(name = "prospect-cli")]
#[command(about = "Discover local businesses and audit their websites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover businesses and audit every website, writing a JSON report
    Audit(AuditArgs),
    /// Audit a single website and print its record
    Inspect {
        /// Website to audit
        #[arg(long)]
        url: String,
        /// Business name to attach to the record
        #[arg(long, default_value = "Unknown")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = prospect_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Audit(args) => audit::run(&config, args).await?,
        Commands::Inspect { url, name } => inspect::run(&config, &url, &name).await?,
    }

    Ok(())
}
