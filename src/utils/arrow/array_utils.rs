//! Utilities for working with Arrow arrays.
//!
//! This module provides helpers for safely extracting typed columns from
//! record batches, casting numeric columns where the stored type differs from
//! the type the pipeline computes with.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int32Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;
use statrs::statistics::Statistics;

use crate::error::{Error, Result};

/// Get a column from a record batch by name
///
/// # Errors
/// Returns a schema error if the column does not exist
pub fn get_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a ArrayRef> {
    batch
        .schema()
        .index_of(column_name)
        .map(|idx| batch.column(idx))
        .map_err(|_| Error::column_not_found(column_name))
}

/// Whether a data type can be cast to the numeric types used by the pipeline
#[must_use]
pub fn is_numeric(data_type: &DataType) -> bool {
    data_type.is_numeric() || matches!(data_type, DataType::Boolean)
}

/// Get a column as `Float64`, casting other numeric types
///
/// # Errors
/// Returns a schema error if the column is missing or not numeric
pub fn float_array(batch: &RecordBatch, column_name: &str) -> Result<Float64Array> {
    let column = get_column(batch, column_name)?;
    if let Some(array) = column.as_any().downcast_ref::<Float64Array>() {
        return Ok(array.clone());
    }
    if !is_numeric(column.data_type()) {
        return Err(Error::column_type(column_name, "numeric"));
    }

    debug!(
        "Casting column '{column_name}' from {:?} to Float64",
        column.data_type()
    );
    let converted = cast(column, &DataType::Float64)?;
    converted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| Error::column_type(column_name, "Float64"))
}

/// Get a column as `Int32`, casting other numeric types
///
/// # Errors
/// Returns a schema error if the column is missing or not numeric
pub fn int_array(batch: &RecordBatch, column_name: &str) -> Result<Int32Array> {
    let column = get_column(batch, column_name)?;
    if let Some(array) = column.as_any().downcast_ref::<Int32Array>() {
        return Ok(array.clone());
    }
    if !is_numeric(column.data_type()) {
        return Err(Error::column_type(column_name, "numeric"));
    }

    let converted = cast(column, &DataType::Int32)?;
    converted
        .as_any()
        .downcast_ref::<Int32Array>()
        .cloned()
        .ok_or_else(|| Error::column_type(column_name, "Int32"))
}

/// Values of a column known to be free of nulls
///
/// # Errors
/// Returns a schema error if the column is missing, not numeric, or still
/// holds nulls
pub fn dense_values(batch: &RecordBatch, column_name: &str) -> Result<Vec<f64>> {
    let array = float_array(batch, column_name)?;
    if array.null_count() > 0 {
        return Err(Error::Schema(format!(
            "Column '{column_name}' has {} missing values after filtering",
            array.null_count()
        )));
    }
    Ok(array.values().to_vec())
}

/// Mean of the non-null values of an array
#[must_use]
pub fn mean_non_null(array: &Float64Array) -> Option<f64> {
    let values: Vec<f64> = array.iter().flatten().collect();
    (!values.is_empty()).then(|| values.mean())
}

/// Return a batch with the given columns replacing same-named columns or
/// appended after the existing ones
///
/// # Errors
/// Returns an error if a column length does not match the batch
pub fn with_columns(batch: &RecordBatch, columns: Vec<(String, ArrayRef)>) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut arrays: Vec<ArrayRef> = batch.columns().to_vec();

    for (name, array) in columns {
        let field = Field::new(&name, array.data_type().clone(), true);
        if let Some(idx) = fields.iter().position(|f| f.name() == &name) {
            fields[idx] = field;
            arrays[idx] = array;
        } else {
            fields.push(field);
            arrays.push(array);
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}
