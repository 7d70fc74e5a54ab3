//! Reporting sink: completeness and latency inserts, expiry, and the reads
//! used to inspect what was written.

use acqmon_core::{LatencyResult, WritePlan, WriteRow};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, info};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from `reporting.completeness`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CompletenessRow {
    pub id: i64,
    pub geo_ref: String,
    pub completeness: Option<f64>,
    pub expected_count: i32,
    pub actual_count: i32,
    pub product_id: String,
    pub sat_acq_time: Option<DateTime<Utc>>,
    pub processing_time: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

/// A row from `reporting.completeness_missing`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MissingSceneRow {
    pub id: i64,
    pub completeness_id: i64,
    pub dataset_id: String,
    pub last_updated: DateTime<Utc>,
}

/// Outcome of persisting a write plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    /// Completeness rows committed.
    pub inserted: usize,
    /// Rows skipped because they were already recorded.
    pub duplicates: usize,
    /// Missing-scene child rows committed.
    pub missing_scenes: usize,
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

/// Persist a write plan.
///
/// Each row and its missing-scene children commit in their own transaction.
/// A row that violates the `(geo_ref, product_id, last_updated)` uniqueness
/// constraint is rolled back, logged at `error`, counted as a duplicate, and
/// the remaining rows are still written.
///
/// # Errors
///
/// Returns [`DbError`] on any failure other than a unique violation. Rows
/// committed before the failure stay committed.
pub async fn insert_completeness(
    pool: &PgPool,
    plan: &WritePlan,
) -> Result<InsertSummary, DbError> {
    let mut summary = InsertSummary::default();

    for row in &plan.rows {
        match insert_completeness_row(pool, row).await {
            Ok(children) => {
                summary.inserted += 1;
                summary.missing_scenes += children;
            }
            Err(e) if e.is_unique_violation() => {
                error!(
                    product = %row.product_id,
                    region = %row.region_label,
                    execution_date = %row.execution_date,
                    "duplicate completeness row in reporting database; skipped"
                );
                summary.duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        rows = plan.len(),
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        missing_scenes = summary.missing_scenes,
        "completeness write plan persisted"
    );
    Ok(summary)
}

/// Insert one parent row and its children atomically. Returns the number of
/// children written.
async fn insert_completeness_row(pool: &PgPool, row: &WriteRow) -> Result<usize, DbError> {
    let expected_count = to_i32("expected_count", row.expected)?;
    let actual_count = to_i32("actual_count", row.actual)?;

    // Dropping the transaction without commit rolls it back.
    let mut tx = pool.begin().await?;

    let completeness_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO reporting.completeness \
         (geo_ref, completeness, expected_count, actual_count, product_id, \
          sat_acq_time, processing_time, last_updated) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(&row.region_label)
    .bind(row.completeness)
    .bind(expected_count)
    .bind(actual_count)
    .bind(&row.product_id)
    .bind(row.latest_sat_acq_ts)
    .bind(row.latest_processing_ts)
    .bind(row.execution_date)
    .fetch_one(&mut *tx)
    .await?;

    for scene in &row.missing_scenes {
        sqlx::query(
            "INSERT INTO reporting.completeness_missing \
             (completeness_id, dataset_id, last_updated) \
             VALUES ($1, $2, $3)",
        )
        .bind(completeness_id)
        .bind(&scene.scene_id)
        .bind(scene.execution_date)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    debug!(
        id = completeness_id,
        product = %row.product_id,
        region = %row.region_label,
        missing = row.missing_scenes.len(),
        "inserted completeness row"
    );
    Ok(row.missing_scenes.len())
}

/// Delete every completeness row for a product. Missing-scene rows go with
/// them through the cascading foreign key.
///
/// Returns the number of completeness rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn expire_completeness(pool: &PgPool, product_id: &str) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM reporting.completeness WHERE product_id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;

    info!(product = %product_id, deleted = result.rows_affected(), "expired completeness rows");
    Ok(result.rows_affected())
}

/// Completeness rows for a product, newest run first, summary row before
/// region rows within a run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_completeness(
    pool: &PgPool,
    product_id: &str,
) -> Result<Vec<CompletenessRow>, DbError> {
    let rows = sqlx::query_as::<_, CompletenessRow>(
        "SELECT id, geo_ref, completeness, expected_count, actual_count, product_id, \
                sat_acq_time, processing_time, last_updated \
         FROM reporting.completeness \
         WHERE product_id = $1 \
         ORDER BY last_updated DESC, id ASC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Missing scenes recorded against one completeness row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_missing_scenes(
    pool: &PgPool,
    completeness_id: i64,
) -> Result<Vec<MissingSceneRow>, DbError> {
    let rows = sqlx::query_as::<_, MissingSceneRow>(
        "SELECT id, completeness_id, dataset_id, last_updated \
         FROM reporting.completeness_missing \
         WHERE completeness_id = $1 \
         ORDER BY dataset_id",
    )
    .bind(completeness_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Latency
// ---------------------------------------------------------------------------

/// Record the latest acquisition and processing times for a product.
///
/// Returns `false` without error when the `(product, last_updated)` pair is
/// already recorded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on any failure other than a unique violation.
pub async fn insert_latency(
    pool: &PgPool,
    product: &str,
    latency: &LatencyResult,
    execution_date: DateTime<Utc>,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO landsat.derivative_latency \
         (product, sat_acq_date, processing_date, last_updated) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(product)
    .bind(latency.latest_sat_acq_ts)
    .bind(latency.latest_processing_ts)
    .bind(execution_date)
    .execute(pool)
    .await
    .map_err(DbError::from);

    match result {
        Ok(_) => {
            info!(
                product = %product,
                sat_acq = %latency.latest_sat_acq_ts,
                processing = ?latency.latest_processing_ts,
                "inserted latency row"
            );
            Ok(true)
        }
        Err(e) if e.is_unique_violation() => {
            error!(
                product = %product,
                execution_date = %execution_date,
                "duplicate latency row in reporting database; skipped"
            );
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

fn to_i32(field: &'static str, value: usize) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::CountOutOfRange { field, value })
}
