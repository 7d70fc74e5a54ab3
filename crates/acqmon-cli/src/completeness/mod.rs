//! Completeness command handlers for the CLI.
//!
//! `run` dispatches on the job kind: ARD jobs compare acquisition API
//! listings against per-sensor catalog products, derivative jobs compare
//! upstream catalog products against a downstream one. Both end in a single
//! write plan handed to the reporting sink.

mod ard;
mod derivative;

use std::path::Path;

use acqmon_core::{
    AppConfig, JobConfig, JobKind, JobsFile, LocalConfig, SourceError, WritePlan,
};
use acqmon_db::CatalogRow;
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Sub-commands available under `completeness`.
#[derive(Debug, Subcommand)]
pub enum CompletenessCommands {
    /// Compute completeness for a job and record it
    Run {
        /// Job name from the jobs file
        #[arg(long)]
        job: String,
        /// End of the query window, RFC 3339 (defaults to now)
        #[arg(long)]
        execution_date: Option<DateTime<Utc>>,
        /// Override the job's lookback window in days
        #[arg(long)]
        days: Option<u32>,
        /// Compute and log without writing to the reporting database
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete every recorded completeness row for a product
    Expire {
        /// Reporting product id
        #[arg(long)]
        product: String,
    },
}

pub(crate) async fn run(config: &AppConfig, command: CompletenessCommands) -> anyhow::Result<()> {
    match command {
        CompletenessCommands::Run {
            job,
            execution_date,
            days,
            dry_run,
        } => {
            let jobs = load_jobs_file(&config.jobs_path)?;
            let job = jobs.find(&job).ok_or_else(|| {
                anyhow::anyhow!("no job named '{job}' in {}", config.jobs_path.display())
            })?;
            let execution_date = execution_date.unwrap_or_else(Utc::now);
            run_job(config, job, execution_date, days, dry_run).await
        }
        CompletenessCommands::Expire { product } => run_expire(config, &product).await,
    }
}

/// Run one completeness job end to end.
///
/// # Errors
///
/// Returns an error if a source query fails, the region list cannot be read,
/// or the reporting sink fails for a reason other than a duplicate row.
pub(crate) async fn run_job(
    config: &AppConfig,
    job: &JobConfig,
    execution_date: DateTime<Utc>,
    days: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let lookback_days = resolve_lookback(job, days, config.default_lookback_days);
    let region_path = config.aux_data_path.join(&job.aoi_file);
    let region_list = acqmon_core::load_region_list(&region_path)?;

    tracing::info!(
        job = %job.name,
        kind = job.kind_label(),
        execution_date = %execution_date,
        lookback_days,
        regions = region_list.len(),
        dry_run,
        "starting completeness job"
    );

    let odc = acqmon_db::connect_odc_pool(config)
        .await
        .context("failed to connect to catalog database")?;

    let plan = match &job.kind {
        JobKind::Ard {
            sensors,
            product_type,
            footprint,
        } => {
            let params = ard::ArdParams {
                sensors,
                product_type,
                footprint: footprint.as_deref(),
            };
            ard::build_plan(config, &odc, &params, &region_list, execution_date, lookback_days)
                .await?
        }
        JobKind::Derivative { upstream, target } => {
            derivative::build_plan(
                &odc,
                upstream,
                target,
                &region_list,
                execution_date,
                lookback_days,
            )
            .await?
        }
    };

    persist_plan(config, &job.name, &plan, dry_run).await
}

/// `--days` wins over the job's own window, which wins over the configured
/// default.
pub(crate) fn resolve_lookback(job: &JobConfig, days: Option<u32>, default: u32) -> u32 {
    days.filter(|d| *d > 0)
        .unwrap_or_else(|| job.lookback_days_or(default))
}

/// Query a catalog product and convert every row with `adapter`. Rows the
/// adapter skips are counted at `debug`.
pub(crate) async fn load_catalog<T>(
    odc: &sqlx::PgPool,
    product: &str,
    execution_date: DateTime<Utc>,
    lookback_days: u32,
    adapter: fn(CatalogRow) -> Result<Option<T>, SourceError>,
) -> anyhow::Result<Vec<T>> {
    let rows = acqmon_db::query_catalog(odc, product, execution_date, lookback_days).await?;
    let adapted = acqmon_db::adapt_rows(rows, adapter)
        .with_context(|| format!("malformed catalog row for product {product}"))?;
    if adapted.skipped > 0 {
        tracing::debug!(
            product = %product,
            skipped = adapted.skipped,
            "catalog rows without region or lineage skipped"
        );
    }
    Ok(adapted.records)
}

async fn persist_plan(
    config: &AppConfig,
    job_name: &str,
    plan: &WritePlan,
    dry_run: bool,
) -> anyhow::Result<()> {
    if dry_run {
        println!(
            "dry-run: {job_name} would insert {} completeness row(s) with {} missing scene(s)",
            plan.len(),
            plan.missing_scene_count()
        );
        for row in &plan.rows {
            println!(
                "  {:<10} {:<28} {:>5}/{:<5} {}",
                row.region_label,
                row.product_id,
                row.actual,
                row.expected,
                row.completeness
                    .map_or_else(|| "-".to_string(), |c| format!("{c:.1}%"))
            );
        }
        return Ok(());
    }

    tracing::info!(job = %job_name, rows = plan.len(), "inserting completeness output");
    let reporting = acqmon_db::connect_reporting_pool(config)
        .await
        .context("failed to connect to reporting database")?;
    let summary = acqmon_db::insert_completeness(&reporting, plan).await?;

    println!(
        "{job_name}: inserted {} row(s), {} missing scene(s); {} duplicate(s) skipped",
        summary.inserted, summary.missing_scenes, summary.duplicates
    );
    Ok(())
}

async fn run_expire(config: &AppConfig, product: &str) -> anyhow::Result<()> {
    let reporting = acqmon_db::connect_reporting_pool(config)
        .await
        .context("failed to connect to reporting database")?;
    let deleted = acqmon_db::expire_completeness(&reporting, product).await?;
    tracing::info!(product = %product, deleted, "expired completeness rows");
    println!("{product}: deleted {deleted} completeness row(s)");
    Ok(())
}

fn load_jobs_file(jobs_path: &Path) -> anyhow::Result<JobsFile> {
    acqmon_core::load_jobs(jobs_path)
        .with_context(|| format!("failed to load jobs from {}", jobs_path.display()))
}

/// Print every configured job. Needs no database configuration.
///
/// # Errors
///
/// Returns an error if the jobs file cannot be loaded.
pub(crate) fn list_jobs(config: &LocalConfig) -> anyhow::Result<()> {
    let jobs = load_jobs_file(&config.jobs_path)?;
    if jobs.jobs.is_empty() {
        println!("no jobs configured in {}", config.jobs_path.display());
        return Ok(());
    }

    for job in &jobs.jobs {
        let lookback = job.lookback_days_or(config.default_lookback_days);
        let products = match &job.kind {
            JobKind::Ard { sensors, .. } => sensors
                .iter()
                .map(|s| s.rep_code.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            JobKind::Derivative { target, .. } => target.clone(),
        };
        println!(
            "{:<22} {:<11} {:>3}d  {}",
            job.name,
            job.kind_label(),
            lookback,
            products
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(lookback_days: Option<u32>) -> JobConfig {
        JobConfig {
            name: "s2_wo".to_string(),
            aoi_file: "sentinel2_aoi_list.txt".to_string(),
            lookback_days,
            kind: JobKind::Derivative {
                upstream: vec!["ga_s2am_ard_provisional_3".to_string()],
                target: "ga_s2_wo_3".to_string(),
            },
        }
    }

    #[test]
    fn cli_days_override_job_window() {
        assert_eq!(resolve_lookback(&job(Some(30)), Some(7), 14), 7);
    }

    #[test]
    fn job_window_overrides_default() {
        assert_eq!(resolve_lookback(&job(Some(30)), None, 14), 30);
    }

    #[test]
    fn default_applies_when_job_has_no_window() {
        assert_eq!(resolve_lookback(&job(None), None, 14), 14);
    }

    #[test]
    fn list_jobs_needs_only_local_config() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
        let local = LocalConfig {
            env: acqmon_core::Environment::Test,
            log_level: "info".to_string(),
            jobs_path: root.join("config").join("jobs.yaml"),
            aux_data_path: root.join("config").join("aux"),
            default_lookback_days: 30,
        };
        list_jobs(&local).expect("bundled jobs file should list");
    }

    #[test]
    fn list_jobs_reports_unreadable_file() {
        let local = LocalConfig {
            env: acqmon_core::Environment::Test,
            log_level: "info".to_string(),
            jobs_path: Path::new("/nonexistent/jobs.yaml").to_path_buf(),
            aux_data_path: Path::new("/nonexistent").to_path_buf(),
            default_lookback_days: 30,
        };
        assert!(list_jobs(&local).is_err());
    }

    #[test]
    fn zero_days_is_ignored() {
        assert_eq!(resolve_lookback(&job(None), Some(0), 14), 14);
    }
}
