//! `acqmon latency`: newest acquisition and processing times for a product.

use acqmon_completeness::compute_latency;
use acqmon_core::{Actual, AppConfig};
use acqmon_db::CatalogRow;
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

pub(crate) async fn run_latency(
    config: &AppConfig,
    product: &str,
    execution_date: DateTime<Utc>,
    days: u32,
    dry_run: bool,
) -> anyhow::Result<()> {
    info!(product = %product, execution_date = %execution_date, days, "starting latency");

    let odc = acqmon_db::connect_odc_pool(config)
        .await
        .context("failed to connect to catalog database")?;
    let rows = acqmon_db::query_catalog(&odc, product, execution_date, days).await?;
    let actual = rows
        .into_iter()
        .map(CatalogRow::into_latency_record)
        .collect::<Result<Vec<Actual>, _>>()?;

    let Some(latency) = compute_latency(&actual) else {
        warn!(product = %product, days, "no datasets in window; nothing to record");
        println!("{product}: no datasets indexed in the last {days} day(s)");
        return Ok(());
    };

    info!(
        product = %product,
        latest_sat_acq_ts = %latency.latest_sat_acq_ts,
        latest_processing_ts = ?latency.latest_processing_ts,
        lag = ?latency.processing_lag(),
        "latency computed"
    );

    if dry_run {
        println!(
            "dry-run: {product} latest acquisition {} processing {}",
            latency.latest_sat_acq_ts,
            latency
                .latest_processing_ts
                .map_or_else(|| "-".to_string(), |t| t.to_string())
        );
        return Ok(());
    }

    let reporting = acqmon_db::connect_reporting_pool(config)
        .await
        .context("failed to connect to reporting database")?;
    let inserted = acqmon_db::insert_latency(&reporting, product, &latency, execution_date).await?;
    if inserted {
        println!("{product}: latency recorded");
    } else {
        println!("{product}: latency already recorded for {execution_date}");
    }
    Ok(())
}
