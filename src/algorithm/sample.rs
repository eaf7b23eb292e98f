//! Sample and design construction
//!
//! Restricts the derived dataset to a column's cohort window and to rows
//! where every referenced column is present, then extracts the response,
//! the design matrix and, for IV columns, the endogenous regressor and the
//! excluded instrument.

use arrow::record_batch::RecordBatch;
use nalgebra::DVector;

use super::specification::ColumnSpec;
use crate::config::StudyConfig;
use crate::error::{Error, Result};
use crate::estimate::{DesignMatrix, NamedColumn};
use crate::filter::Expr;
use crate::models::CohortRange;
use crate::utils::arrow::dense_values;
use crate::utils::logging::log_sample_reduction;

/// Regression inputs of one column
#[derive(Debug, Clone)]
pub struct Sample {
    pub response: DVector<f64>,
    /// OLS: full design. IV: exogenous regressors only.
    pub design: DesignMatrix,
    pub endogenous: Option<NamedColumn>,
    pub instrument: Option<NamedColumn>,
    /// Rows kept by the filter
    pub rows: RecordBatch,
}

impl Sample {
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.rows.num_rows()
    }
}

/// Row filter of a column: its cohort window and complete cases over the
/// outcome and every regressor
#[must_use]
pub fn sample_filter(spec: &ColumnSpec) -> Expr {
    let regressors = spec.regressors();
    let mut columns: Vec<&str> = regressors.columns();
    columns.push(&spec.outcome);
    Expr::And(vec![
        Expr::cohort_window(spec.cohort_range),
        Expr::complete_cases(&columns),
    ])
}

/// Builds [`Sample`]s from the derived dataset
#[derive(Debug, Clone, Copy)]
pub struct SampleBuilder {
    span: CohortRange,
}

impl SampleBuilder {
    #[must_use]
    pub const fn new(span: CohortRange) -> Self {
        Self { span }
    }

    #[must_use]
    pub const fn from_config(config: &StudyConfig) -> Self {
        Self::new(config.cohort_span)
    }

    /// Filter `data` for `spec` and extract its regression inputs
    ///
    /// # Errors
    /// Returns a specification error for an invalid column, a schema error
    /// if a referenced column is absent and an empty-sample error if no row
    /// survives the filter
    pub fn build(&self, data: &RecordBatch, spec: &ColumnSpec) -> Result<Sample> {
        spec.validate(self.span)?;

        let filter = sample_filter(spec);
        let schema = data.schema();
        let missing: Vec<String> = filter
            .required_columns()
            .into_iter()
            .filter(|c| schema.index_of(c).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Schema(format!(
                "Column '{}' needs missing columns: {}",
                spec.label,
                missing.join(", ")
            )));
        }

        let rows = filter.filter(data)?;
        log_sample_reduction(&spec.label, data.num_rows(), rows.num_rows());
        if rows.num_rows() == 0 {
            return Err(Error::EmptySample(format!(
                "No complete observations for '{}' in {}",
                spec.outcome, spec.cohort_range
            )));
        }

        let regressors = spec.regressors();
        let columns = regressors
            .exogenous
            .iter()
            .map(|name| dense_values(&rows, name))
            .collect::<Result<Vec<_>>>()?;
        let design = DesignMatrix::from_columns(regressors.exogenous.clone(), &columns)?;
        let response = DVector::from_vec(dense_values(&rows, &spec.outcome)?);

        let named = |name: Option<&String>| -> Result<Option<NamedColumn>> {
            name.map(|n| -> Result<NamedColumn> {
                Ok(NamedColumn::new(n.clone(), dense_values(&rows, n)?))
            })
            .transpose()
        };
        let endogenous = named(regressors.endogenous.as_ref())?;
        let instrument = named(regressors.instrument.as_ref())?;

        Ok(Sample {
            response,
            design,
            endogenous,
            instrument,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, Int32Array};
    use arrow::datatypes::{DataType, Field, Schema};

    use super::*;
    use crate::algorithm::derive::VariableDeriver;
    use crate::algorithm::specification::Controls;
    use crate::config::MissingCohortPolicy;
    use crate::models::{CORE_COHORTS, FULL_SPAN};

    fn raw() -> RecordBatch {
        let cohorts: Vec<Option<i32>> = (0..12)
            .map(|i| match i {
                10 => Some(1957),
                11 => None,
                _ => Some(1958 + i % 5),
            })
            .collect();
        let highnumber: Vec<f64> = (0..12).map(|i| f64::from(i % 2)).collect();
        let crime: Vec<Option<f64>> = (0..12).map(|i| Some(0.05 + 0.01 * f64::from(i))).collect();
        let schema = Schema::new(vec![
            Field::new("cohort", DataType::Int32, true),
            Field::new("highnumber", DataType::Float64, true),
            Field::new("sm", DataType::Float64, true),
            Field::new("crimerate", DataType::Float64, true),
            Field::new("malvinas", DataType::Float64, true),
        ]);
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(cohorts)),
            Arc::new(Float64Array::from(highnumber.clone())),
            Arc::new(Float64Array::from(highnumber)),
            Arc::new(Float64Array::from(crime)),
            Arc::new(Float64Array::from(vec![0.0; 12])),
        ];
        let batch = RecordBatch::try_new(Arc::new(schema), columns).unwrap();
        VariableDeriver::new(FULL_SPAN, MissingCohortPolicy::Propagate)
            .derive(&batch)
            .unwrap()
    }

    #[test]
    fn test_core_window_ols_design() {
        let sample = SampleBuilder::new(FULL_SPAN)
            .build(&raw(), &ColumnSpec::ols(CORE_COHORTS))
            .unwrap();
        assert_eq!(sample.design.nrows(), 10);
        assert_eq!(sample.design.ncols(), 6);
        assert_eq!(
            sample.design.names(),
            &[
                "highnumber",
                "cohort_1959",
                "cohort_1960",
                "cohort_1961",
                "cohort_1962",
                "constant"
            ]
        );
        assert!(sample.endogenous.is_none());
        assert!(sample.instrument.is_none());
        assert_eq!(sample.response.len(), 10);
    }

    #[test]
    fn test_iv_sample_splits_regressors() {
        let sample = SampleBuilder::new(FULL_SPAN)
            .build(&raw(), &ColumnSpec::iv(CORE_COHORTS))
            .unwrap();
        assert_eq!(sample.design.names()[0], "constant");
        assert_eq!(sample.design.ncols(), 5);
        assert_eq!(sample.endogenous.unwrap().name, "sm");
        assert_eq!(sample.instrument.unwrap().name, "highnumber");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let data = raw();
        let filter = sample_filter(&ColumnSpec::ols(CORE_COHORTS));
        let once = filter.filter(&data).unwrap();
        let twice = filter.filter(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_control_columns_are_schema_error() {
        let spec = ColumnSpec::ols(CORE_COHORTS).with_controls(Controls::With);
        let result = SampleBuilder::new(FULL_SPAN).build(&raw(), &spec);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_empty_window() {
        let spec = ColumnSpec::ols(CohortRange::new(1930, 1935)).without_dummies();
        let result = SampleBuilder::new(FULL_SPAN).build(&raw(), &spec);
        assert!(matches!(result, Err(Error::EmptySample(_))));
    }

    #[test]
    fn test_baseline_dummy_is_rejected() {
        let spec = ColumnSpec::ols(FULL_SPAN).with_dummies(FULL_SPAN);
        let result = SampleBuilder::new(FULL_SPAN).build(&raw(), &spec);
        assert!(matches!(result, Err(Error::Specification(_))));
    }
}
