//! ARD jobs: acquisition API listings against per-sensor catalog products.

use acqmon_completeness::{
    compute_completeness, filter_expected_to_sensor, generate_write_plan, log_results,
};
use acqmon_copernicus::{CopernicusClient, ProductQuery};
use acqmon_core::{Actual, AppConfig, Expected, SensorConfig, WritePlan};
use acqmon_db::CatalogRow;
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::load_catalog;

pub(super) struct ArdParams<'a> {
    pub sensors: &'a [SensorConfig],
    pub product_type: &'a str,
    pub footprint: Option<&'a str>,
}

/// Expected acquisitions are fetched once; each sensor's catalog product is
/// then loaded and reconciled against its share of them.
pub(super) async fn build_plan(
    config: &AppConfig,
    odc: &PgPool,
    params: &ArdParams<'_>,
    region_list: &[String],
    execution_date: DateTime<Utc>,
    lookback_days: u32,
) -> anyhow::Result<WritePlan> {
    let client =
        CopernicusClient::from_app_config(config).context("failed to build Copernicus client")?;
    let query = ProductQuery::window(params.product_type, execution_date, lookback_days)
        .with_footprint(params.footprint.map(str::to_string));
    let expected = client.query_expected(&query).await?;

    let mut per_sensor = Vec::with_capacity(params.sensors.len());
    for sensor in params.sensors {
        let actual = load_catalog(
            odc,
            &sensor.odc_code,
            execution_date,
            lookback_days,
            CatalogRow::into_actual_direct,
        )
        .await?;
        per_sensor.push((sensor, actual));
    }

    Ok(sensor_plans(&expected, &per_sensor, region_list, execution_date))
}

/// One summary row and one row per region for each sensor, concatenated in
/// sensor order. Each sensor only sees the expected records tagged with its
/// id, and its rows carry its `rep_code`.
pub(super) fn sensor_plans(
    expected: &[Expected],
    per_sensor: &[(&SensorConfig, Vec<Actual>)],
    region_list: &[String],
    execution_date: DateTime<Utc>,
) -> WritePlan {
    let mut plan = WritePlan::default();
    for (sensor, actual) in per_sensor {
        let sensor_expected = filter_expected_to_sensor(expected, &sensor.id);
        tracing::info!(
            sensor = %sensor.id,
            expected = sensor_expected.len(),
            actual = actual.len(),
            "sensor inputs loaded"
        );

        let (summary, results) = compute_completeness(&sensor_expected, actual, region_list);
        log_results(&sensor.rep_code, &summary, &results);
        plan.extend(generate_write_plan(
            &sensor.rep_code,
            &summary,
            &results,
            execution_date,
        ));
    }
    plan
}
