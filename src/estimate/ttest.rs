//! Welch two-sample t-test

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use crate::error::{Error, Result};

/// Result of a two-sample mean comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTest {
    pub statistic: f64,
    pub p_value: f64,
    /// Welch-Satterthwaite degrees of freedom
    pub df: f64,
}

/// Test equality of means of `a` and `b` without assuming equal variances
///
/// The statistic is `mean(a) - mean(b)` over its standard error.
///
/// # Errors
/// Returns a fit error if either sample has fewer than two observations or
/// both samples are constant
#[allow(clippy::cast_precision_loss)]
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<TTest> {
    if a.len() < 2 || b.len() < 2 {
        return Err(Error::Fit(format!(
            "t-test needs two observations per group (got {} and {})",
            a.len(),
            b.len()
        )));
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (mean_a, mean_b) = (a.mean(), b.mean());
    let (var_a, var_b) = (a.variance() / na, b.variance() / nb);
    let se2 = var_a + var_b;
    if se2 <= 0.0 {
        return Err(Error::Fit("t-test is undefined for two constant samples".to_string()));
    }

    let statistic = (mean_a - mean_b) / se2.sqrt();
    let df = se2.powi(2) / (var_a.powi(2) / (na - 1.0) + var_b.powi(2) / (nb - 1.0));
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| Error::Fit(e.to_string()))?;
    let p_value = 2.0 * dist.sf(statistic.abs());

    Ok(TTest {
        statistic,
        p_value,
        df,
    })
}
