//! Type normalization of loaded batches
//!
//! Birth year and draft number become `Int32`; every other numeric column
//! becomes `Float64` with NaN turned into null, the missing-value encoding
//! of files exported from statistics packages.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};
use crate::models::columns::{COHORT, CRIME_RATE, DRAFT_NUMBER, HIGH_NUMBER, SERVED};
use crate::utils::arrow::{float_array, is_numeric, with_columns};

/// Columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 4] = [COHORT, HIGH_NUMBER, SERVED, CRIME_RATE];

/// Columns stored as integers after normalization
const INTEGER_COLUMNS: [&str; 2] = [COHORT, DRAFT_NUMBER];

/// Check that the required columns are present
///
/// # Errors
/// Returns a schema error naming the first missing column
pub fn validate_required_columns(schema: &Schema) -> Result<()> {
    match REQUIRED_COLUMNS
        .iter()
        .find(|name| schema.index_of(name).is_err())
    {
        Some(missing) => Err(Error::column_not_found(missing)),
        None => Ok(()),
    }
}

fn nan_to_null(array: &Float64Array) -> Float64Array {
    if array.values().iter().any(|v| v.is_nan()) {
        array.iter().map(|v| v.filter(|x| !x.is_nan())).collect()
    } else {
        array.clone()
    }
}

/// Cast the numeric columns of a batch to the pipeline's types
///
/// Non-numeric columns are left untouched.
///
/// # Errors
/// Returns an error if a cast fails
pub fn normalize_batch(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut columns: Vec<(String, ArrayRef)> = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let name = field.name();
        if !is_numeric(field.data_type()) {
            continue;
        }
        let values = nan_to_null(&float_array(batch, name)?);
        let array: ArrayRef = if INTEGER_COLUMNS.contains(&name.as_str()) {
            cast(&values, &DataType::Int32)?
        } else {
            Arc::new(values)
        };
        columns.push((name.clone(), array));
    }

    with_columns(batch, columns)
}

/// Normalize every batch and concatenate them into one
///
/// # Errors
/// Returns an error if there are no batches or their schemas disagree
pub fn concat_normalized(batches: &[RecordBatch]) -> Result<RecordBatch> {
    let normalized = batches
        .iter()
        .map(normalize_batch)
        .collect::<Result<Vec<_>>>()?;

    let Some(first) = normalized.first() else {
        return Err(Error::Schema("Dataset contains no record batches".to_string()));
    };
    Ok(concat_batches(&first.schema(), &normalized)?)
}
