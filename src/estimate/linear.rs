//! Dense least-squares estimators
//!
//! OLS and just-identified 2SLS on `nalgebra` matrices. Normal equations are
//! solved through a Cholesky factorisation of the Gram matrix; a pivot that
//! keeps less than `rank_tolerance` of its column's squared norm marks the
//! column as collinear with the ones before it and the fit is refused.
//!
//! Reported standard errors are heteroskedasticity robust (HC0 sandwich).
//! OLS p-values come from the conventional t statistic with `n - k` degrees
//! of freedom; IV p-values from the robust z statistic.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use rustc_hash::FxHashMap;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use super::{DesignMatrix, Estimator, NamedColumn, RegressionResult};
use crate::error::{Error, Result};

/// Default relative pivot size below which a design is rank deficient
pub const DEFAULT_RANK_TOLERANCE: f64 = 1e-10;

/// Least-squares estimator on dense matrices
#[derive(Debug, Clone, Copy)]
pub struct LinearEstimator {
    rank_tolerance: f64,
}

impl Default for LinearEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_RANK_TOLERANCE)
    }
}

impl LinearEstimator {
    #[must_use]
    pub const fn new(rank_tolerance: f64) -> Self {
        Self { rank_tolerance }
    }

    /// Factorise `X'X`, refusing designs with a (numerically) collinear column
    fn factorize(&self, x: &DMatrix<f64>, names: &[String]) -> Result<Cholesky<f64, Dyn>> {
        let gram = x.transpose() * x;
        let chol = gram.clone().cholesky().ok_or_else(|| {
            Error::Fit("Design matrix is singular (X'X is not positive definite)".to_string())
        })?;

        let l = chol.l();
        for j in 0..gram.ncols() {
            let diag = gram[(j, j)];
            if diag <= 0.0 || l[(j, j)].powi(2) / diag < self.rank_tolerance {
                let name = names.get(j).map_or("?", String::as_str);
                return Err(Error::Fit(format!(
                    "Design matrix is rank deficient: '{name}' is collinear with preceding regressors"
                )));
            }
        }
        Ok(chol)
    }
}

/// `(X'X)⁻¹ X' diag(e²) X (X'X)⁻¹`
fn hc0_covariance(x: &DMatrix<f64>, residuals: &DVector<f64>, xtx_inv: &DMatrix<f64>) -> DMatrix<f64> {
    let mut scaled = x.clone();
    for (mut row, e) in scaled.row_iter_mut().zip(residuals.iter()) {
        row *= *e;
    }
    let meat = scaled.transpose() * &scaled;
    xtx_inv * meat * xtx_inv
}

/// Two-sided p-value of `estimate / std_error` given the survival function
/// of the reference distribution
fn two_sided_p(estimate: f64, std_error: f64, sf: impl Fn(f64) -> f64) -> f64 {
    if std_error > 0.0 {
        2.0 * sf((estimate / std_error).abs())
    } else if estimate == 0.0 {
        1.0
    } else {
        0.0
    }
}

fn check_rows(n: usize, k: usize, what: &str) -> Result<()> {
    if n <= k {
        return Err(Error::Fit(format!(
            "{what} needs more observations ({n}) than regressors ({k})"
        )));
    }
    Ok(())
}

fn named(names: &[String], values: impl Iterator<Item = f64>) -> FxHashMap<String, f64> {
    names.iter().cloned().zip(values).collect()
}

#[allow(clippy::cast_precision_loss)]
impl Estimator for LinearEstimator {
    fn fit_ols(&self, response: &DVector<f64>, design: &DesignMatrix) -> Result<RegressionResult> {
        let x = design.values();
        let (n, k) = x.shape();
        if response.len() != n {
            return Err(Error::Fit(format!(
                "Response has {} rows, design has {n}",
                response.len()
            )));
        }
        check_rows(n, k, "OLS")?;

        let chol = self.factorize(x, design.names())?;
        let beta = chol.solve(&(x.transpose() * response));
        let xtx_inv = chol.inverse();
        let residuals = response - x * &beta;

        let dof = (n - k) as f64;
        let sigma2 = residuals.norm_squared() / dof;
        let robust = hc0_covariance(x, &residuals, &xtx_inv);
        let t_dist = StudentsT::new(0.0, 1.0, dof).map_err(|e| Error::Fit(e.to_string()))?;

        let std_errors: Vec<f64> = (0..k).map(|j| robust[(j, j)].max(0.0).sqrt()).collect();
        let classical: Vec<f64> = (0..k)
            .map(|j| (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt())
            .collect();
        let p_values = (0..k).map(|j| two_sided_p(beta[j], classical[j], |t| t_dist.sf(t)));

        let names = design.names();
        Ok(RegressionResult {
            names: names.to_vec(),
            coefficients: named(names, beta.iter().copied()),
            std_errors: named(names, std_errors.into_iter()),
            classical_std_errors: named(names, classical.iter().copied()),
            p_values: named(names, p_values),
            n_obs: n,
            first_stage_f: None,
        })
    }

    fn fit_iv(
        &self,
        response: &DVector<f64>,
        exogenous: &DesignMatrix,
        endogenous: &NamedColumn,
        instrument: &NamedColumn,
    ) -> Result<RegressionResult> {
        let z1 = exogenous.values();
        let (n, k1) = z1.shape();
        if response.len() != n || endogenous.values.len() != n || instrument.values.len() != n {
            return Err(Error::Fit(format!(
                "IV inputs have mismatched lengths (response {}, exogenous {n}, {} {}, {} {})",
                response.len(),
                endogenous.name,
                endogenous.values.len(),
                instrument.name,
                instrument.values.len()
            )));
        }
        let k = k1 + 1;
        check_rows(n, k, "2SLS")?;

        let mut names: Vec<String> = exogenous.names().to_vec();
        let x_endog = &endogenous.values;

        // First stage on Z = [exogenous | instrument]
        let z = DMatrix::from_fn(n, k, |i, j| if j < k1 { z1[(i, j)] } else { instrument.values[i] });
        let mut z_names = names.clone();
        z_names.push(instrument.name.clone());
        let z_chol = self.factorize(&z, &z_names)?;
        let gamma = z_chol.solve(&(z.transpose() * x_endog));
        let x_hat = &z * &gamma;
        let rss_unrestricted = (x_endog - &x_hat).norm_squared();

        let rss_restricted = if k1 == 0 {
            x_endog.norm_squared()
        } else {
            let r_chol = self.factorize(z1, exogenous.names())?;
            let delta = r_chol.solve(&(z1.transpose() * x_endog));
            (x_endog - z1 * delta).norm_squared()
        };
        let first_stage_f = if rss_unrestricted > 0.0 {
            (rss_restricted - rss_unrestricted) / (rss_unrestricted / (n - k) as f64)
        } else {
            f64::INFINITY
        };

        // Second stage on [exogenous | fitted endogenous]
        names.push(endogenous.name.clone());
        let x2_hat = DMatrix::from_fn(n, k, |i, j| if j < k1 { z1[(i, j)] } else { x_hat[i] });
        let chol = self.factorize(&x2_hat, &names)?;
        let beta = chol.solve(&(x2_hat.transpose() * response));
        let xtx_inv = chol.inverse();

        // Structural residuals use the observed endogenous regressor
        let x2 = DMatrix::from_fn(n, k, |i, j| if j < k1 { z1[(i, j)] } else { x_endog[i] });
        let residuals = response - &x2 * &beta;

        let robust = hc0_covariance(&x2_hat, &residuals, &xtx_inv);
        let sigma2 = residuals.norm_squared() / (n - k) as f64;
        let normal = Normal::new(0.0, 1.0).map_err(|e| Error::Fit(e.to_string()))?;

        let std_errors: Vec<f64> = (0..k).map(|j| robust[(j, j)].max(0.0).sqrt()).collect();
        let classical = (0..k).map(|j| (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt());
        let p_values: Vec<f64> = (0..k)
            .map(|j| two_sided_p(beta[j], std_errors[j], |t| normal.sf(t)))
            .collect();

        log::debug!(
            "2SLS on {n} observations: first-stage F for '{}' = {first_stage_f:.2}",
            instrument.name
        );
        Ok(RegressionResult {
            coefficients: named(&names, beta.iter().copied()),
            std_errors: named(&names, std_errors.into_iter()),
            classical_std_errors: named(&names, classical),
            p_values: named(&names, p_values.into_iter()),
            names,
            n_obs: n,
            first_stage_f: Some(first_stage_f),
        })
    }
}
