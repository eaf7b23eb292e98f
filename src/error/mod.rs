//! Error handling for the replication pipeline.
//!
//! Every fallible operation in the crate returns [`Result`]. The first four
//! variants are the pipeline's own taxonomy; the rest wrap failures from the
//! storage and serialization layers so they can be propagated with `?`.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors produced while loading data, building specifications or fitting
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid method/controls combination or malformed column specification
    #[error("Specification error: {0}")]
    Specification(String),

    /// Sample filtering left no usable rows
    #[error("Empty sample: {0}")]
    EmptySample(String),

    /// The estimator could not produce a result (singular design, undefined ratio)
    #[error("Fit error: {0}")]
    Fit(String),

    /// The dataset is missing an expected column or has an unusable type
    #[error("Schema error: {0}")]
    Schema(String),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error decoding Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error from an Arrow compute kernel
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error converting typed records to Arrow
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_arrow::Error),

    /// Error writing the JSON report
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Worker pool for parallel column fits could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Schema error for a column that is not present in the dataset
    #[must_use]
    pub fn column_not_found(column: &str) -> Self {
        Self::Schema(format!("Column '{column}' not found"))
    }

    /// Schema error for a column whose type cannot be used
    #[must_use]
    pub fn column_type(column: &str, expected: &str) -> Self {
        Self::Schema(format!("Column '{column}' is not a {expected} array"))
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
