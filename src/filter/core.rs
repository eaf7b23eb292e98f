//! Core row filtering for record batches
//!
//! Masks are produced by [`Expr`](super::expr::Expr) evaluation and applied
//! here to every column of a batch.

use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::{filter as arrow_filter, prep_null_mask_filter};
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};

/// Filter a record batch based on a boolean mask
///
/// Rows whose mask entry is false or null are dropped.
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
///
/// # Returns
/// A new record batch with only rows where mask is true
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(Error::Schema(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    let mask = if mask.null_count() > 0 {
        prep_null_mask_filter(mask)
    } else {
        mask.clone()
    };

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, &mask))
        .collect::<std::result::Result<_, _>>()?;

    Ok(RecordBatch::try_new(batch.schema(), filtered_columns)?)
}

/// Mask with the same value for every row
#[must_use]
pub fn constant_mask(len: usize, value: bool) -> BooleanArray {
    BooleanArray::from(vec![value; len])
}
