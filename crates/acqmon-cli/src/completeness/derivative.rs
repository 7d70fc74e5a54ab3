//! Derivative jobs: upstream catalog products against a downstream product
//! whose datasets point back at their parents.

use acqmon_completeness::{compute_completeness, generate_write_plan, log_results};
use acqmon_core::WritePlan;
use acqmon_db::CatalogRow;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::load_catalog;

pub(super) async fn build_plan(
    odc: &PgPool,
    upstream: &[String],
    target: &str,
    region_list: &[String],
    execution_date: DateTime<Utc>,
    lookback_days: u32,
) -> anyhow::Result<WritePlan> {
    let mut expected = Vec::new();
    for product in upstream {
        let records = load_catalog(
            odc,
            product,
            execution_date,
            lookback_days,
            CatalogRow::into_expected,
        )
        .await?;
        tracing::debug!(product = %product, records = records.len(), "upstream loaded");
        expected.extend(records);
    }

    let actual = load_catalog(
        odc,
        target,
        execution_date,
        lookback_days,
        CatalogRow::into_actual_derivative,
    )
    .await?;
    tracing::info!(
        target = %target,
        expected = expected.len(),
        actual = actual.len(),
        "derivative inputs loaded"
    );

    let (summary, results) = compute_completeness(&expected, &actual, region_list);
    log_results(target, &summary, &results);
    Ok(generate_write_plan(target, &summary, &results, execution_date))
}
