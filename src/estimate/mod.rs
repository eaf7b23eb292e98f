//! Regression capability
//!
//! The pipeline talks to estimators through the [`Estimator`] trait: an OLS
//! fit of a response on a design matrix, and a just-identified IV fit with
//! one endogenous regressor and one excluded instrument. [`LinearEstimator`]
//! is the dense implementation used by default.

pub mod linear;
pub mod ttest;

use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{Error, Result};

pub use linear::LinearEstimator;
pub use ttest::{TTest, welch_t_test};

/// Named regressor columns of a regression, one row per observation
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    names: Vec<String>,
    values: DMatrix<f64>,
}

impl DesignMatrix {
    /// Build a design matrix from named columns of equal length
    ///
    /// # Errors
    /// Returns a fit error if the number of names and columns differ or the
    /// columns have different lengths
    pub fn from_columns(names: Vec<String>, columns: &[Vec<f64>]) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(Error::Fit(format!(
                "{} regressor names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        let nrows = columns.first().map_or(0, Vec::len);
        if let Some((idx, _)) = columns.iter().enumerate().find(|(_, c)| c.len() != nrows) {
            return Err(Error::Fit(format!(
                "Regressor '{}' has {} rows, expected {nrows}",
                names[idx],
                columns[idx].len()
            )));
        }
        let values =
            DMatrix::from_iterator(nrows, columns.len(), columns.iter().flatten().copied());
        Ok(Self { names, values })
    }

    /// Regressor names in column order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    #[must_use]
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Values of the named regressor
    #[must_use]
    pub fn column(&self, name: &str) -> Option<DVector<f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| self.values.column(j).into_owned())
    }
}

/// A single named data column
#[derive(Debug, Clone, PartialEq)]
pub struct NamedColumn {
    pub name: String,
    pub values: DVector<f64>,
}

impl NamedColumn {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: DVector::from_vec(values),
        }
    }
}

/// Estimate, robust standard error and p-value of one regressor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TermEstimate {
    pub estimate: f64,
    pub std_error: f64,
    pub p_value: f64,
}

/// Output of one estimator invocation
///
/// Every regressor name appears in each of the maps.
#[derive(Debug, Clone, Serialize)]
pub struct RegressionResult {
    /// Regressor names in design order
    pub names: Vec<String>,
    pub coefficients: FxHashMap<String, f64>,
    /// Heteroskedasticity-robust standard errors
    pub std_errors: FxHashMap<String, f64>,
    /// Conventional standard errors under homoskedasticity
    pub classical_std_errors: FxHashMap<String, f64>,
    pub p_values: FxHashMap<String, f64>,
    pub n_obs: usize,
    /// First-stage F statistic of the excluded instrument (IV only)
    pub first_stage_f: Option<f64>,
}

impl RegressionResult {
    /// Estimate of the named regressor, if it was part of the fit
    #[must_use]
    pub fn term(&self, name: &str) -> Option<TermEstimate> {
        Some(TermEstimate {
            estimate: *self.coefficients.get(name)?,
            std_error: *self.std_errors.get(name)?,
            p_value: *self.p_values.get(name)?,
        })
    }
}

/// Regression capability consumed by the runner
pub trait Estimator: Send + Sync {
    /// Fit `response` on `design` by ordinary least squares
    ///
    /// # Errors
    /// Returns a fit error if the design is rank deficient or has no more
    /// rows than columns
    fn fit_ols(&self, response: &DVector<f64>, design: &DesignMatrix)
    -> Result<RegressionResult>;

    /// Fit `response` by two-stage least squares, instrumenting
    /// `endogenous` with `instrument` and including `exogenous`
    ///
    /// # Errors
    /// Returns a fit error if either stage is rank deficient or the sample
    /// is too small
    fn fit_iv(
        &self,
        response: &DVector<f64>,
        exogenous: &DesignMatrix,
        endogenous: &NamedColumn,
        instrument: &NamedColumn,
    ) -> Result<RegressionResult>;
}
