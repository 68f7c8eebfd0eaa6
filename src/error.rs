//! Error types for braid-lab

use thiserror::Error;

/// Main error type for experiment operations
#[derive(Error, Debug)]
pub enum BraidError {
    #[error("Experiment series '{0}' not found in store")]
    SeriesNotFound(String),

    #[error("Invalid series configuration: {0}")]
    InvalidSeries(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Experiment {experiment_id} in series '{series}' failed: {message}")]
    ExperimentFailed {
        series: String,
        experiment_id: usize,
        message: String,
    },

    #[error("Series '{series}' incomplete: {completed} of {expected} experiments persisted")]
    SeriesIncomplete {
        series: String,
        completed: usize,
        expected: usize,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for experiment operations
pub type BraidResult<T> = Result<T, BraidError>;
