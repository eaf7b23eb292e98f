//! Async Parquet reading
//!
//! Streams record batches with `ParquetRecordBatchStreamBuilder` over
//! `tokio::fs::File`. Files of a directory are read concurrently.

use std::path::Path;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use futures::future::try_join_all;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;
use tokio::fs::File;

use super::normalize::{concat_normalized, validate_required_columns};
use super::sync_reader::dataset_files;
use crate::config::StudyConfig;
use crate::error::Result;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Read a Parquet file asynchronously into Arrow record batches
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub async fn read_parquet_async(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file asynchronously", path);

    let file = File::open(path).await?;
    let stream = ParquetRecordBatchStreamBuilder::new(file)
        .await?
        .with_batch_size(batch_size)
        .build()?;
    let batches = stream.try_collect::<Vec<_>>().await?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    let columns = batches.first().map_or(0, RecordBatch::num_columns);
    log_operation_complete("Read", path, rows, columns, Some(start.elapsed()));
    Ok(batches)
}

/// Read the lottery dataset asynchronously from a file or directory
///
/// # Errors
/// Returns an error if reading fails, the files have incompatible schemas
/// or a required column is missing
pub async fn read_dataset_async(path: &Path, config: &StudyConfig) -> Result<RecordBatch> {
    let files = dataset_files(path)?;
    let per_file = try_join_all(
        files
            .iter()
            .map(|file| read_parquet_async(file, config.batch_size)),
    )
    .await?;

    let batches: Vec<RecordBatch> = per_file.into_iter().flatten().collect();
    let dataset = concat_normalized(&batches)?;
    validate_required_columns(&dataset.schema())?;
    log::info!(
        "Loaded {} observations from {} file(s) under {}",
        dataset.num_rows(),
        files.len(),
        path.display()
    );
    Ok(dataset)
}
