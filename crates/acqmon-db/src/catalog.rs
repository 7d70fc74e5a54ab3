//! Read-only queries against the product catalog (Open Data Cube `agdc`
//! schema) and the adapters that turn catalog rows into engine records.
//!
//! Catalog products store their metadata in different document layouts, so
//! each product id maps to a [`QueryShape`] whose SQL pulls the same seven
//! columns out of the right JSON paths.

use acqmon_core::{Actual, Expected, SourceError};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::DbError;

const SOURCE_NAME: &str = "catalog";

// ---------------------------------------------------------------------------
// Query shapes
// ---------------------------------------------------------------------------

/// Metadata layout of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Legacy EO documents (level-1 NRT granules): tile id at the top level,
    /// region parsed out of it.
    EoGranule,
    /// EO3 analysis-ready data: tile/scene id and region code in
    /// `properties`.
    Eo3Ard,
    /// EO3 products derived from one upstream dataset, joined through
    /// `agdc.dataset_source` to expose the parent's granule id.
    Eo3Derivative,
    /// EO3 multi-year summaries with no per-granule id; the dataset label
    /// stands in for it.
    Eo3Summary,
}

impl QueryShape {
    /// Look up the shape for a catalog product id.
    ///
    /// Every product that records its upstream dataset in
    /// `agdc.dataset_source` reads through [`QueryShape::Eo3Derivative`], so
    /// its parent granule id is always available for joining.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownProduct`] for products with no registered
    /// layout.
    pub fn for_product(product_id: &str) -> Result<Self, DbError> {
        let shape = match product_id {
            "s2a_nrt_granule" | "s2b_nrt_granule" => Self::EoGranule,
            "ga_s2am_ard_provisional_3"
            | "ga_s2bm_ard_provisional_3"
            | "s2a_ard_granule"
            | "s2b_ard_granule"
            | "ga_ls5t_ard_3"
            | "ga_ls7e_ard_3"
            | "ga_ls8c_ard_3"
            | "ga_ls7e_ard_provisional_3"
            | "ga_ls8c_ard_provisional_3" => Self::Eo3Ard,
            "ga_s2_wo_3" | "ga_s2_ba_provisional_3" | "ga_ls_wo_3" | "ga_ls_fc_3" => {
                Self::Eo3Derivative
            }
            "ga_ls7e_nbart_gm_cyear_3"
            | "ga_ls8c_nbart_gm_cyear_3"
            | "ga_ls_wo_fq_cyear_3"
            | "ga_ls_wo_fq_apr_oct_3"
            | "ga_ls_wo_fq_nov_mar_3" => Self::Eo3Summary,
            other => return Err(DbError::UnknownProduct(other.to_string())),
        };
        Ok(shape)
    }

    /// SQL selecting `id, indexed_time, granule_id, parent_id, region_id,
    /// sat_acq_ts, processing_ts`. Binds `$1` product, `$2` window start,
    /// `$3` window end.
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            Self::EoGranule => SELECT_EO_GRANULE,
            Self::Eo3Ard => SELECT_EO3_ARD,
            Self::Eo3Derivative => SELECT_EO3_DERIVATIVE,
            Self::Eo3Summary => SELECT_EO3_SUMMARY,
        }
    }
}

const SELECT_EO_GRANULE: &str = "\
SELECT
    dataset.id,
    dataset.added AS indexed_time,
    dataset.metadata #>> '{tile_id}' AS granule_id,
    NULL::text AS parent_id,
    substring(dataset.metadata #>> '{tile_id}' FROM '_T([0-9]{2}[A-Z]{3})_') AS region_id,
    agdc.common_timestamp(dataset.metadata #>> '{extent,center_dt}') AS sat_acq_ts,
    agdc.common_timestamp(dataset.metadata #>> '{system_information,time_processed}') AS processing_ts
FROM agdc.dataset
    JOIN agdc.dataset_type ON dataset_type.id = dataset.dataset_type_ref
WHERE dataset.archived IS NULL
    AND dataset_type.name = $1
    AND dataset.added >= $2
    AND dataset.added <= $3";

const SELECT_EO3_ARD: &str = "\
SELECT
    dataset.id,
    dataset.added AS indexed_time,
    COALESCE(
        dataset.metadata #>> '{properties,sentinel:sentinel_tile_id}',
        dataset.metadata #>> '{properties,landsat:landsat_scene_id}'
    ) AS granule_id,
    NULL::text AS parent_id,
    dataset.metadata #>> '{properties,odc:region_code}' AS region_id,
    agdc.common_timestamp(dataset.metadata #>> '{properties,datetime}') AS sat_acq_ts,
    agdc.common_timestamp(dataset.metadata #>> '{properties,odc:processing_datetime}') AS processing_ts
FROM agdc.dataset
    JOIN agdc.dataset_type ON dataset_type.id = dataset.dataset_type_ref
WHERE dataset.archived IS NULL
    AND dataset_type.name = $1
    AND dataset.added >= $2
    AND dataset.added <= $3";

const SELECT_EO3_DERIVATIVE: &str = "\
SELECT
    dataset.id,
    dataset.added AS indexed_time,
    dataset.metadata #>> '{label}' AS granule_id,
    COALESCE(
        parent.metadata #>> '{properties,sentinel:sentinel_tile_id}',
        parent.metadata #>> '{properties,landsat:landsat_scene_id}'
    ) AS parent_id,
    dataset.metadata #>> '{properties,odc:region_code}' AS region_id,
    agdc.common_timestamp(dataset.metadata #>> '{properties,datetime}') AS sat_acq_ts,
    agdc.common_timestamp(dataset.metadata #>> '{properties,odc:processing_datetime}') AS processing_ts
FROM agdc.dataset
    JOIN agdc.dataset_type ON dataset_type.id = dataset.dataset_type_ref
    LEFT JOIN agdc.dataset_source ON dataset_source.dataset_ref = dataset.id
    LEFT JOIN agdc.dataset parent ON parent.id = dataset_source.source_dataset_ref
WHERE dataset.archived IS NULL
    AND dataset_type.name = $1
    AND dataset.added >= $2
    AND dataset.added <= $3";

const SELECT_EO3_SUMMARY: &str = "\
SELECT
    dataset.id,
    dataset.added AS indexed_time,
    dataset.metadata #>> '{label}' AS granule_id,
    NULL::text AS parent_id,
    dataset.metadata #>> '{properties,odc:region_code}' AS region_id,
    agdc.common_timestamp(dataset.metadata #>> '{properties,datetime}') AS sat_acq_ts,
    agdc.common_timestamp(dataset.metadata #>> '{properties,odc:processing_datetime}') AS processing_ts
FROM agdc.dataset
    JOIN agdc.dataset_type ON dataset_type.id = dataset.dataset_type_ref
WHERE dataset.archived IS NULL
    AND dataset_type.name = $1
    AND dataset.added >= $2
    AND dataset.added <= $3";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// One catalog dataset within the query window.
///
/// Every metadata-derived column is nullable because catalog documents are
/// not validated against a schema; the adapters skip rows that are out of
/// scope and reject rows they cannot represent.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CatalogRow {
    pub id: Uuid,
    pub indexed_time: DateTime<Utc>,
    pub granule_id: Option<String>,
    pub parent_id: Option<String>,
    pub region_id: Option<String>,
    pub sat_acq_ts: Option<DateTime<Utc>>,
    pub processing_ts: Option<DateTime<Utc>>,
}

/// Fetch a product's datasets indexed in `[as_of - lookback_days, as_of]`.
///
/// # Errors
///
/// Returns [`DbError::UnknownProduct`] if the product has no query shape, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn query_catalog(
    pool: &PgPool,
    product_id: &str,
    as_of: DateTime<Utc>,
    lookback_days: u32,
) -> Result<Vec<CatalogRow>, DbError> {
    let shape = QueryShape::for_product(product_id)?;
    let (start, end) = query_window(as_of, lookback_days);

    info!(product = %product_id, start = %start, end = %end, "querying catalog");
    debug!(product = %product_id, shape = ?shape, "catalog query shape");

    let rows = sqlx::query_as::<_, CatalogRow>(shape.sql())
        .bind(product_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    info!(product = %product_id, rows = rows.len(), "catalog query returned");
    Ok(rows)
}

/// `[as_of - lookback_days, as_of]`.
#[must_use]
pub fn query_window(as_of: DateTime<Utc>, lookback_days: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    (as_of - Duration::days(i64::from(lookback_days)), as_of)
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

/// Records converted from a batch of catalog rows, plus how many rows were
/// out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapted<T> {
    pub records: Vec<T>,
    /// Rows with no region, or derivatives with no recorded parent. They can
    /// never match a listed region or an expected dataset.
    pub skipped: usize,
}

/// Convert every row with `adapter`, counting rows it skips.
///
/// # Errors
///
/// Returns the first [`SourceError`] raised by `adapter`.
pub fn adapt_rows<T>(
    rows: Vec<CatalogRow>,
    adapter: fn(CatalogRow) -> Result<Option<T>, SourceError>,
) -> Result<Adapted<T>, SourceError> {
    let mut adapted = Adapted {
        records: Vec::with_capacity(rows.len()),
        skipped: 0,
    };
    for row in rows {
        match adapter(row)? {
            Some(record) => adapted.records.push(record),
            None => adapted.skipped += 1,
        }
    }
    Ok(adapted)
}

impl CatalogRow {
    /// Reshape an upstream catalog row into an expected record, tagging it
    /// with a sensor derived from the granule id (`"S2A_..."` -> `"s2a"`).
    /// Rows with no region are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingField`] if the row has no granule id.
    pub fn into_expected(self) -> Result<Option<Expected>, SourceError> {
        let Some(region_id) = self.region_id.clone() else {
            return Ok(None);
        };
        let granule_id = self.require_granule()?;
        let sensor = sensor_from_granule(&granule_id);

        let mut expected = Expected::new(granule_id, region_id).with_sensor(sensor);
        expected.center_dt = self.sat_acq_ts;
        Ok(Some(expected))
    }

    /// Actual record joined on its own granule id. Rows with no region are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingField`] if the granule id or acquisition
    /// time is absent.
    pub fn into_actual_direct(self) -> Result<Option<Actual>, SourceError> {
        let Some(region_id) = self.region_id.clone() else {
            return Ok(None);
        };
        let granule_id = self.require_granule()?;
        let center_dt = self.require_sat_acq()?;
        Ok(Some(Actual::direct(
            granule_id,
            region_id,
            center_dt,
            self.processing_ts,
        )))
    }

    /// Actual record joined on its upstream parent's granule id. Rows with no
    /// region or no lineage are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingField`] if the acquisition time is
    /// absent.
    pub fn into_actual_derivative(self) -> Result<Option<Actual>, SourceError> {
        let (Some(parent_id), Some(region_id)) = (self.parent_id.clone(), self.region_id.clone())
        else {
            return Ok(None);
        };
        let center_dt = self.require_sat_acq()?;
        let dataset_id = self.granule_id.unwrap_or_else(|| self.id.to_string());
        Ok(Some(Actual::derived(
            dataset_id,
            parent_id,
            region_id,
            center_dt,
            self.processing_ts,
        )))
    }

    /// Actual record for latency reporting. Region and lineage are not read,
    /// so only the acquisition time is required.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingField`] if the acquisition time is
    /// absent.
    pub fn into_latency_record(self) -> Result<Actual, SourceError> {
        let center_dt = self.require_sat_acq()?;
        let dataset_id = self.granule_id.unwrap_or_else(|| self.id.to_string());
        Ok(Actual::direct(
            dataset_id,
            self.region_id.unwrap_or_default(),
            center_dt,
            self.processing_ts,
        ))
    }

    fn require_granule(&self) -> Result<String, SourceError> {
        self.granule_id
            .clone()
            .ok_or_else(|| self.missing("granule_id"))
    }

    fn require_sat_acq(&self) -> Result<DateTime<Utc>, SourceError> {
        self.sat_acq_ts.ok_or_else(|| self.missing("sat_acq_ts"))
    }

    fn missing(&self, field: &'static str) -> SourceError {
        SourceError::MissingField {
            source_name: SOURCE_NAME,
            record: self.id.to_string(),
            field,
        }
    }
}

/// Lowercased first three characters of a granule id.
fn sensor_from_granule(granule_id: &str) -> String {
    granule_id.chars().take(3).collect::<String>().to_lowercase()
}
