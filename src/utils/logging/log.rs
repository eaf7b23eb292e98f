//! Logging helpers
//!
//! Consistent message shapes for dataset loading and table estimation, so
//! the log reads the same whichever entry point produced it.

use std::path::Path;
use std::time::Duration;

/// Log the start of an operation on a file or directory
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log a completed load of `rows` observations with `columns` attributes
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    rows: usize,
    columns: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => log::info!(
            "{} {} rows x {} columns from {} in {:?}",
            operation,
            rows,
            columns,
            path.display(),
            duration
        ),
        None => log::info!(
            "{} {} rows x {} columns from {}",
            operation,
            rows,
            columns,
            path.display()
        ),
    }
}

/// Log a sample reduction produced by a filter
pub fn log_sample_reduction(context: &str, before: usize, after: usize) {
    if after < before {
        log::debug!("{context}: kept {after} of {before} rows");
    }
}

/// Log a table that could not be produced and was skipped
pub fn log_table_skipped(table: &str, reason: &dyn std::fmt::Display) {
    log::warn!("Skipping {table}: {reason}");
}
