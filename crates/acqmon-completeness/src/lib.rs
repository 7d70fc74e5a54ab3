//! Completeness and latency computation.
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! [`log_results`]. Inputs are borrowed, outputs are fresh values, so the
//! same inputs always produce the same results.

pub mod engine;
pub mod latency;
pub mod partition;
pub mod plan;
pub mod report;

pub use engine::{
    completeness_percent, compute_completeness, compute_region, filter_expected_to_sensor,
    summarize,
};
pub use latency::compute_latency;
pub use partition::{partition, Partitioned};
pub use plan::generate_write_plan;
pub use report::log_results;
