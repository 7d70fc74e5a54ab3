mod completeness;
mod db;
mod latency;

use acqmon_core::AppConfig;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::completeness::CompletenessCommands;
use crate::db::DbCommands;

#[derive(Debug, Parser)]
#[command(name = "acqmon")]
#[command(about = "Satellite acquisition completeness and latency reporting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute and record completeness for a configured job
    Completeness {
        #[command(subcommand)]
        command: CompletenessCommands,
    },
    /// Record the latest acquisition and processing times for a product
    Latency {
        /// Catalog product id (e.g. s2a_nrt_granule)
        #[arg(long)]
        product: String,
        /// End of the query window, RFC 3339 (defaults to now)
        #[arg(long)]
        execution_date: Option<DateTime<Utc>>,
        /// Window length in days
        #[arg(long, default_value = "3")]
        days: u32,
        /// Compute and log without writing to the reporting database
        #[arg(long)]
        dry_run: bool,
    },
    /// List configured jobs
    Jobs,
    /// Reporting database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("acqmon: no command given; run `acqmon --help`");
        return Ok(());
    };

    match command {
        Commands::Completeness { command } => {
            let config = load_config()?;
            completeness::run(&config, command).await
        }
        Commands::Latency {
            product,
            execution_date,
            days,
            dry_run,
        } => {
            let config = load_config()?;
            let execution_date = execution_date.unwrap_or_else(Utc::now);
            latency::run_latency(&config, &product, execution_date, days, dry_run).await
        }
        Commands::Jobs => {
            // Local files only; no database URLs required.
            let local = acqmon_core::load_local_config()?;
            init_tracing(&local.log_level)?;
            completeness::list_jobs(&local)
        }
        Commands::Db { command } => {
            let config = load_config()?;
            db::run(&config, command).await
        }
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = acqmon_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(config = ?config, "loaded configuration");
    Ok(config)
}

/// `RUST_LOG` wins; otherwise `log_level` from configuration.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
