//! Result persistence
//!
//! The store is a plain data sink with a narrow call contract: series
//! definitions go in and out whole, experiment records are appended exactly
//! once per run and re-sorted by `experiment_id` on load. Workers never
//! share a store handle - each opens its own.

mod json;

pub use json::JsonStore;

use crate::error::BraidResult;
use crate::experiment::{ExperimentRecord, ExperimentSeries};

/// Call contract between the experiment machinery and the data sink
pub trait ResultStore: Send {
    /// Load a series definition by name
    fn fetch_series(&self, name: &str) -> BraidResult<ExperimentSeries>;

    /// Create or overwrite a series definition. Overwriting a series that
    /// already has persisted experiments flags it as outdated.
    fn put_series(&self, series: &ExperimentSeries) -> BraidResult<()>;

    /// Names of all stored series, sorted
    fn list_series(&self) -> BraidResult<Vec<String>>;

    /// Clear the outdated flag, called right before a sweep reruns
    fn mark_series_current(&self, name: &str) -> BraidResult<()>;

    /// Write measurement results back onto the series row
    fn update_series_measurements(
        &self,
        name: &str,
        weight_kg: f64,
        height_m: f64,
    ) -> BraidResult<()>;

    /// Append one experiment record. Called exactly once per run.
    fn insert_experiment(&self, record: &ExperimentRecord) -> BraidResult<()>;

    /// All records of a series, sorted into sweep order by `experiment_id`
    fn load_experiments(&self, series_name: &str) -> BraidResult<Vec<ExperimentRecord>>;

    /// Drop all records of a series (before a rerun)
    fn delete_experiments(&self, series_name: &str) -> BraidResult<()>;
}
