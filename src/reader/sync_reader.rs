//! Synchronous Parquet reading and writing

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;

use super::normalize::{concat_normalized, validate_required_columns};
use crate::config::StudyConfig;
use crate::error::{Error, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Find all Parquet files in a directory, sorted by path
///
/// # Errors
/// Returns an error if the directory cannot be read or holds no Parquet file
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    log_operation_start("Searching for parquet files in", dir);

    let files = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .filter_ok(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "parquet"))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .sorted()
        .collect_vec();

    if files.is_empty() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No Parquet files found in {}", dir.display()),
        )));
    }
    log::debug!("Found {} parquet files in {}", files.len(), dir.display());
    Ok(files)
}

/// The files making up a dataset: the path itself, or every Parquet file of
/// a directory
///
/// # Errors
/// Returns an error if a directory cannot be listed
pub fn dataset_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        find_parquet_files(path)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

/// Read a Parquet file into Arrow record batches
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub fn read_parquet(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path);

    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size)
        .build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    let columns = batches.first().map_or(0, RecordBatch::num_columns);
    log_operation_complete("Read", path, rows, columns, Some(start.elapsed()));
    Ok(batches)
}

/// Read the lottery dataset from a file or directory into one batch
///
/// Files of a directory are read in parallel; their batches are normalized
/// and concatenated in path order.
///
/// # Errors
/// Returns an error if reading fails, the files have incompatible schemas
/// or a required column is missing
pub fn read_dataset(path: &Path, config: &StudyConfig) -> Result<RecordBatch> {
    let start = Instant::now();
    let files = dataset_files(path)?;

    let batches = files
        .par_iter()
        .map(|file| read_parquet(file, config.batch_size))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect_vec();

    let dataset = concat_normalized(&batches)?;
    validate_required_columns(&dataset.schema())?;
    log_operation_complete(
        "Loaded dataset of",
        path,
        dataset.num_rows(),
        dataset.num_columns(),
        Some(start.elapsed()),
    );
    Ok(dataset)
}

/// Write a batch to a Parquet file
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    log_operation_start("Writing parquet file", path);
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}
