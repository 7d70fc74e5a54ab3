//! Reporting database maintenance commands.

use acqmon_core::AppConfig;
use anyhow::Context;
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that both databases accept connections
    Ping,
    /// Apply pending reporting-schema migrations
    Migrate,
}

pub(crate) async fn run(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            let reporting = acqmon_db::connect_reporting_pool(config)
                .await
                .context("failed to connect to reporting database")?;
            acqmon_db::ping(&reporting).await?;
            println!("reporting database: ok");

            let odc = acqmon_db::connect_odc_pool(config)
                .await
                .context("failed to connect to catalog database")?;
            acqmon_db::ping(&odc).await?;
            println!("catalog database: ok");
        }
        DbCommands::Migrate => {
            let reporting = acqmon_db::connect_reporting_pool(config)
                .await
                .context("failed to connect to reporting database")?;
            let applied = acqmon_db::run_migrations(&reporting).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
