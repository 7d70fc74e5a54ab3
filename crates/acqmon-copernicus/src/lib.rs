//! Client for the Copernicus Open Access Hub search API, the source of
//! expected Sentinel-2 acquisitions.

pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::{CopernicusClient, ProductQuery, DEFAULT_PAGE_SIZE};
pub use error::CopernicusError;
pub use normalize::{entry_to_expected, region_from_title, sensor_from_title};
pub use types::{Entry, Feed, NamedValue, OneOrMany, SearchResponse};
