//! Loading the lottery dataset from Parquet
//!
//! A dataset is one Parquet file or a directory of Parquet files. Batches
//! are normalized to the pipeline's column types and concatenated into a
//! single [`RecordBatch`](arrow::record_batch::RecordBatch), which the rest
//! of the pipeline only ever reads.

pub mod async_reader;
pub mod normalize;
pub mod sync_reader;

pub use async_reader::{read_dataset_async, read_parquet_async};
pub use normalize::{
    REQUIRED_COLUMNS, concat_normalized, normalize_batch, validate_required_columns,
};
pub use sync_reader::{
    dataset_files, find_parquet_files, read_dataset, read_parquet, write_parquet,
};
