//! Variable deriver
//!
//! Appends the columns every regression draws on to the raw dataset:
//! one dummy per birth year of the cohort span, the regression constant and
//! the `highnumber * malvinas` interaction. The input columns are never
//! modified.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int32Array};
use arrow::compute::kernels::numeric::mul;
use arrow::record_batch::RecordBatch;
use log::{debug, info};

use crate::config::{MissingCohortPolicy, StudyConfig};
use crate::error::Result;
use crate::models::CohortRange;
use crate::models::columns::{
    COHORT, CONSTANT, HIGH_NUMBER, HN_MALVINAS, MALVINAS, cohort_dummy,
};
use crate::utils::arrow::{float_array, int_array, with_columns};

/// Builds derived columns from raw observations
#[derive(Debug, Clone, Copy)]
pub struct VariableDeriver {
    span: CohortRange,
    policy: MissingCohortPolicy,
}

impl VariableDeriver {
    /// Create a deriver producing dummies for every year of `span`
    #[must_use]
    pub const fn new(span: CohortRange, policy: MissingCohortPolicy) -> Self {
        Self { span, policy }
    }

    /// Create a deriver from the study configuration
    #[must_use]
    pub fn from_config(config: &StudyConfig) -> Self {
        Self::new(config.cohort_span, config.missing_cohort_policy)
    }

    /// Return the dataset extended with cohort dummies, `constant` and
    /// `hn_malvinas`
    ///
    /// # Errors
    /// Returns a schema error if `cohort`, `highnumber` or `malvinas` is
    /// missing or not numeric
    pub fn derive(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let cohort = int_array(batch, COHORT)?;
        let highnumber = float_array(batch, HIGH_NUMBER)?;
        let malvinas = float_array(batch, MALVINAS)?;

        let mut derived: Vec<(String, ArrayRef)> = Vec::with_capacity(self.span.len() + 2);
        for year in self.span.years() {
            let indicator = self.cohort_indicator(&cohort, year);
            derived.push((cohort_dummy(year), Arc::new(indicator)));
        }
        derived.push((
            CONSTANT.to_string(),
            Arc::new(Float64Array::from(vec![1.0; batch.num_rows()])),
        ));
        derived.push((HN_MALVINAS.to_string(), mul(&highnumber, &malvinas)?));

        debug!(
            "Missing cohort for {} of {} rows ({} policy)",
            cohort.null_count(),
            batch.num_rows(),
            self.policy
        );
        info!(
            "Derived {} cohort dummies for {}, {} and {}",
            self.span.len(),
            self.span,
            CONSTANT,
            HN_MALVINAS
        );
        with_columns(batch, derived)
    }

    fn cohort_indicator(&self, cohort: &Int32Array, year: i32) -> Float64Array {
        let missing = match self.policy {
            MissingCohortPolicy::Propagate => None,
            MissingCohortPolicy::LegacyZero => Some(0.0),
        };
        cohort
            .iter()
            .map(|value| match value {
                Some(c) if c == year => Some(1.0),
                Some(_) => Some(0.0),
                None => missing,
            })
            .collect()
    }
}
