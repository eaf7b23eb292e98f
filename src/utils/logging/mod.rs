//! Logging utilities for output and progress tracking

pub mod log;
pub mod progress;

pub use log::{log_operation_complete, log_operation_start, log_sample_reduction, log_table_skipped};
pub use progress::{create_column_progress_bar, finish_progress_bar};
