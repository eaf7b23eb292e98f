//! Expression-based row filtering
//!
//! Sample restrictions are written as [`Expr`] trees and evaluated with
//! Arrow's vectorized comparison and boolean kernels. Every comparison is
//! done in `Float64` space, which is exact for birth years and 0/1 flags.
//! A row whose column value is missing never satisfies a comparison.

use std::collections::BTreeSet;

use arrow::array::{Array, BooleanArray, Float64Array};
use arrow::compute::kernels::cmp::{eq, gt_eq, lt_eq};
use arrow::compute::{and, is_not_null, prep_null_mask_filter};
use arrow::record_batch::RecordBatch;

use super::core::{constant_mask, filter_record_batch};
use crate::error::Result;
use crate::models::CohortRange;
use crate::models::columns::COHORT;
use crate::utils::arrow::{float_array, get_column};

/// A filter expression over the columns of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column equals a literal value
    Eq(String, LiteralValue),

    /// Column lies in an inclusive interval
    Between(String, LiteralValue, LiteralValue),

    /// Column is not null
    IsNotNull(String),

    /// Logical AND of expressions
    And(Vec<Expr>),
}

/// A literal value used in filter expressions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue {
    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),
}

impl LiteralValue {
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl Expr {
    /// Rows whose birth year falls inside `range`
    #[must_use]
    pub fn cohort_window(range: CohortRange) -> Self {
        Self::Between(COHORT.to_string(), range.first.into(), range.last.into())
    }

    /// Rows where every named column is present
    #[must_use]
    pub fn complete_cases<S: AsRef<str>>(columns: &[S]) -> Self {
        Self::And(
            columns
                .iter()
                .map(|c| Self::IsNotNull(c.as_ref().to_string()))
                .collect(),
        )
    }

    /// Rows where `column` equals `value`
    #[must_use]
    pub fn equals(column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::Eq(column.to_string(), value.into())
    }

    /// Returns the set of all column names required by this expression
    #[must_use]
    pub fn required_columns(&self) -> BTreeSet<String> {
        let mut columns = BTreeSet::new();
        self.collect_required_columns(&mut columns);
        columns
    }

    fn collect_required_columns(&self, columns: &mut BTreeSet<String>) {
        match self {
            Self::Eq(col, _) | Self::Between(col, _, _) | Self::IsNotNull(col) => {
                columns.insert(col.clone());
            }
            Self::And(exprs) => {
                for expr in exprs {
                    expr.collect_required_columns(columns);
                }
            }
        }
    }

    /// Evaluate the expression to a null-free mask over the rows of `batch`
    ///
    /// # Errors
    /// Returns a schema error if a referenced column is missing or not
    /// numeric, or an Arrow error if a kernel fails
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let rows = batch.num_rows();
        match self {
            Self::Eq(col, value) => compare(batch, col, *value, Comparison::Eq),
            Self::Between(col, lo, hi) => {
                let lower = compare(batch, col, *lo, Comparison::GtEq)?;
                let upper = compare(batch, col, *hi, Comparison::LtEq)?;
                Ok(and(&lower, &upper)?)
            }
            Self::IsNotNull(col) => Ok(is_not_null(get_column(batch, col)?)?),
            Self::And(exprs) => {
                exprs
                    .iter()
                    .try_fold(constant_mask(rows, true), |acc, e| -> Result<_> {
                        Ok(and(&acc, &e.evaluate(batch)?)?)
                    })
            }
        }
    }

    /// Keep the rows of `batch` that satisfy the expression
    ///
    /// # Errors
    /// Returns an error if evaluation or filtering fails
    pub fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.evaluate(batch)?;
        filter_record_batch(batch, &mask)
    }
}

#[derive(Debug, Clone, Copy)]
enum Comparison {
    Eq,
    GtEq,
    LtEq,
}

fn compare(
    batch: &RecordBatch,
    column: &str,
    value: LiteralValue,
    comparison: Comparison,
) -> Result<BooleanArray> {
    let array = float_array(batch, column)?;
    let scalar = Float64Array::new_scalar(value.as_f64());
    let mask = match comparison {
        Comparison::Eq => eq(&array, &scalar)?,
        Comparison::GtEq => gt_eq(&array, &scalar)?,
        Comparison::LtEq => lt_eq(&array, &scalar)?,
    };
    // Missing values compare as false
    Ok(if mask.null_count() > 0 {
        prep_null_mask_filter(&mask)
    } else {
        mask
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int32Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("cohort", DataType::Int32, true),
            Field::new("crimerate", DataType::Float64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from(vec![
                    Some(1957),
                    Some(1958),
                    None,
                    Some(1962),
                    Some(1963),
                ])),
                Arc::new(Float64Array::from(vec![
                    Some(0.1),
                    None,
                    Some(0.3),
                    Some(0.4),
                    Some(0.5),
                ])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_cohort_window_excludes_missing_cohort() {
        let mask = Expr::cohort_window(CohortRange::new(1958, 1962))
            .evaluate(&batch())
            .unwrap();
        let values: Vec<bool> = (0..mask.len()).map(|i| mask.value(i)).collect();
        assert_eq!(values, vec![false, true, false, true, false]);
        assert_eq!(mask.null_count(), 0);
    }

    #[test]
    fn test_equals_on_missing_value_is_false() {
        let mask = Expr::equals("cohort", 1958).evaluate(&batch()).unwrap();
        assert!(mask.value(1));
        assert!(!mask.value(2));
        assert_eq!(mask.null_count(), 0);
    }

    #[test]
    fn test_complete_cases_and_window() {
        let expr = Expr::And(vec![
            Expr::cohort_window(CohortRange::new(1958, 1962)),
            Expr::complete_cases(&["crimerate"]),
        ]);
        let filtered = expr.filter(&batch()).unwrap();
        assert_eq!(filtered.num_rows(), 1);

        let required = expr.required_columns();
        assert!(required.contains("cohort"));
        assert!(required.contains("crimerate"));
    }

    #[test]
    fn test_empty_conjunction_and_missing_column() {
        assert_eq!(Expr::And(Vec::new()).filter(&batch()).unwrap().num_rows(), 5);
        assert!(Expr::equals("missing", 1.0).evaluate(&batch()).is_err());
        let none = Expr::cohort_window(CohortRange::single(1960))
            .filter(&batch())
            .unwrap();
        assert_eq!(none.num_rows(), 0);
    }
}
