//! A Rust library replicating draft-lottery estimates of the effect of
//! conscription on crime, from Parquet input to formatted tables.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod estimate;
pub mod filter;
pub mod models;
pub mod reader;
pub mod report;
pub mod tables;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{MissingCohortPolicy, StudyConfig};
pub use error::{Error, Result};
pub use models::{CORE_COHORTS, CohortRange, FULL_SPAN, Observation, Stat};

// Pipeline
pub use algorithm::{
    ColumnSpec, ColumnStatistics, Controls, EffectScaling, Method, RegressionRunner, SampleBuilder,
    TableResult, TableSpec, VariableDeriver, balance_table, summary_table,
};
pub use estimate::{DesignMatrix, Estimator, LinearEstimator, NamedColumn, RegressionResult};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Filtering capabilities
pub use filter::{Expr, LiteralValue, filter_record_batch};

// Loading and output
pub use reader::{read_dataset, read_dataset_async, read_parquet, write_parquet};
pub use report::{StudyReport, write_json};
pub use tables::regression_tables;
