//! Regression runner and aggregator
//!
//! Fits every column of a [`TableSpec`] through an [`Estimator`] and
//! collects one immutable [`ColumnStatistics`] record per column, in
//! declaration order. Columns are independent and are fitted in parallel
//! over the shared read-only dataset when the configuration allows it.

use std::time::Instant;

use arrow::record_batch::RecordBatch;
use log::{debug, info};
use rayon::ThreadPool;
use rayon::prelude::*;
use serde::Serialize;

use super::sample::SampleBuilder;
use super::specification::{ColumnSpec, Controls, EffectScaling, Method, TableSpec, TermRow};
use crate::config::StudyConfig;
use crate::error::{Error, Result};
use crate::estimate::{Estimator, RegressionResult, TermEstimate};
use crate::filter::Expr;
use crate::models::columns::{HIGH_NUMBER, SERVED};
use crate::models::{CohortRange, Stat};
use crate::utils::arrow::{float_array, mean_non_null};
use crate::utils::logging::{create_column_progress_bar, finish_progress_bar};

/// Service rates of the eligible (`p1`) and exempt (`p2`) groups
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplianceRates {
    pub p1: f64,
    pub p2: f64,
}

impl ComplianceRates {
    /// Measure the rates over `window`, ignoring rows with missing service
    ///
    /// # Errors
    /// Returns an empty-sample error if either eligibility group has no row
    /// with observed service
    pub fn from_data(data: &RecordBatch, window: CohortRange) -> Result<Self> {
        let observed = Expr::And(vec![
            Expr::cohort_window(window),
            Expr::IsNotNull(SERVED.to_string()),
        ]);
        let rate = |eligible: i32| -> Result<f64> {
            let rows = Expr::And(vec![observed.clone(), Expr::equals(HIGH_NUMBER, eligible)])
                .filter(data)?;
            mean_non_null(&float_array(&rows, SERVED)?).ok_or_else(|| {
                Error::EmptySample(format!(
                    "No observed service among {HIGH_NUMBER} == {eligible} in {window}"
                ))
            })
        };
        Ok(Self {
            p1: rate(1)?,
            p2: rate(0)?,
        })
    }
}

/// Scale an intention-to-treat coefficient by the compliance difference
///
/// # Errors
/// Returns a fit error if `p1 == p2`
pub fn wald_estimate(coefficient: f64, rates: ComplianceRates) -> Result<f64> {
    let difference = rates.p1 - rates.p2;
    if difference == 0.0 {
        return Err(Error::Fit(format!(
            "Wald estimate undefined: equal compliance rates ({})",
            rates.p1
        )));
    }
    Ok(coefficient / difference)
}

/// `100 * effect / baseline`
///
/// # Errors
/// Returns a fit error if the baseline is zero
pub fn percent_change(effect: f64, baseline: f64) -> Result<f64> {
    if baseline == 0.0 {
        return Err(Error::Fit(
            "Percent change undefined: baseline mean is zero".to_string(),
        ));
    }
    Ok(100.0 * effect / baseline)
}

/// Mean of `outcome` among draft-exempt rows of `range`
///
/// # Errors
/// Returns an empty-sample error if no exempt row has the outcome
pub fn baseline_mean(data: &RecordBatch, outcome: &str, range: CohortRange) -> Result<f64> {
    let exempt = Expr::And(vec![
        Expr::cohort_window(range),
        Expr::equals(HIGH_NUMBER, 0),
    ])
    .filter(data)?;
    mean_non_null(&float_array(&exempt, outcome)?).ok_or_else(|| {
        Error::EmptySample(format!("No draft-exempt observations of '{outcome}' in {range}"))
    })
}

/// Estimate of one table row in one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermStatistic {
    pub name: String,
    pub stat: Stat<TermEstimate>,
}

/// Statistics of one fitted column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStatistics {
    pub label: String,
    pub method: Method,
    pub controls: Controls,
    pub cohort_range: CohortRange,
    pub outcome: String,
    /// One entry per table row, in row order
    pub terms: Vec<TermStatistic>,
    pub n_obs: usize,
    pub percent_change: Stat<f64>,
    pub first_stage_f: Option<f64>,
}

impl ColumnStatistics {
    /// Estimate of `name`, `NotApplicable` if it was not a table row or not
    /// part of this column's fit
    #[must_use]
    pub fn term(&self, name: &str) -> Stat<TermEstimate> {
        self.terms
            .iter()
            .find(|t| t.name == name)
            .map_or(Stat::NotApplicable, |t| t.stat)
    }

    fn collect(
        spec: &ColumnSpec,
        rows: &[TermRow],
        result: &RegressionResult,
        percent_change: Stat<f64>,
    ) -> Self {
        let terms = rows
            .iter()
            .map(|row| TermStatistic {
                name: row.term.clone(),
                stat: result.term(&row.term).into(),
            })
            .collect();
        Self {
            label: spec.label.clone(),
            method: spec.method,
            controls: spec.controls,
            cohort_range: spec.cohort_range,
            outcome: spec.outcome.clone(),
            terms,
            n_obs: result.n_obs,
            percent_change,
            first_stage_f: result.first_stage_f,
        }
    }
}

/// Fitted columns of a table
#[derive(Debug, Clone, Serialize)]
pub struct TableResult {
    pub spec: TableSpec,
    pub columns: Vec<ColumnStatistics>,
    /// Rates behind the Wald-scaled percent changes, if any column has one
    pub compliance: Option<ComplianceRates>,
}

/// Runs table specifications against the derived dataset
pub struct RegressionRunner<'a, E: Estimator> {
    data: &'a RecordBatch,
    estimator: E,
    config: &'a StudyConfig,
    samples: SampleBuilder,
    pool: Option<ThreadPool>,
}

impl<'a, E: Estimator> RegressionRunner<'a, E> {
    /// Create a runner over the derived dataset
    ///
    /// # Errors
    /// Returns an error if the worker pool cannot be built
    pub fn new(data: &'a RecordBatch, estimator: E, config: &'a StudyConfig) -> Result<Self> {
        let pool = if config.parallel {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.num_threads)
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self {
            data,
            estimator,
            config,
            samples: SampleBuilder::from_config(config),
            pool,
        })
    }

    /// Compliance rates of the reference window, measured only when one of
    /// `specs` is Wald scaled
    fn compliance_for<'s>(
        &self,
        mut specs: impl Iterator<Item = &'s ColumnSpec>,
    ) -> Result<Option<ComplianceRates>> {
        if !specs.any(|spec| spec.scaling == EffectScaling::Wald) {
            return Ok(None);
        }
        let rates = ComplianceRates::from_data(self.data, self.config.reference_window)?;
        debug!(
            "Compliance in {}: p1 = {:.4}, p2 = {:.4}",
            self.config.reference_window, rates.p1, rates.p2
        );
        Ok(Some(rates))
    }

    /// Fit one column and collect the estimates of `rows`
    ///
    /// # Errors
    /// Propagates specification, sample, schema and fit errors
    pub fn run_column(&self, spec: &ColumnSpec, rows: &[TermRow]) -> Result<ColumnStatistics> {
        let rates = self.compliance_for(std::iter::once(spec))?;
        self.fit_column(spec, rows, rates)
    }

    fn fit_column(
        &self,
        spec: &ColumnSpec,
        rows: &[TermRow],
        rates: Option<ComplianceRates>,
    ) -> Result<ColumnStatistics> {
        let sample = self.samples.build(self.data, spec)?;
        debug!(
            "Column '{}' ({}): {} observations, {} regressors",
            spec.label,
            spec.method,
            sample.n_obs(),
            sample.design.ncols()
        );

        let result = match spec.method {
            Method::Ols => self.estimator.fit_ols(&sample.response, &sample.design)?,
            Method::Iv => {
                let (Some(endogenous), Some(instrument)) = (&sample.endogenous, &sample.instrument)
                else {
                    return Err(Error::Specification(format!(
                        "IV column '{}' has no instrument",
                        spec.label
                    )));
                };
                self.estimator
                    .fit_iv(&sample.response, &sample.design, endogenous, instrument)?
            }
        };

        let percent_change = self.percent_change(spec, &result, rates)?;
        Ok(ColumnStatistics::collect(spec, rows, &result, percent_change))
    }

    fn percent_change(
        &self,
        spec: &ColumnSpec,
        result: &RegressionResult,
        rates: Option<ComplianceRates>,
    ) -> Result<Stat<f64>> {
        if spec.scaling == EffectScaling::None {
            return Ok(Stat::NotApplicable);
        }
        let focal = spec.method.focal_term();
        let coefficient = *result.coefficients.get(focal).ok_or_else(|| {
            Error::Fit(format!("'{focal}' missing from the fit of '{}'", spec.label))
        })?;
        let effect = match spec.scaling {
            EffectScaling::Wald => {
                let rates = rates.ok_or_else(|| {
                    Error::Specification(format!(
                        "Wald-scaled column '{}' run without compliance rates",
                        spec.label
                    ))
                })?;
                wald_estimate(coefficient, rates)?
            }
            EffectScaling::Direct | EffectScaling::None => coefficient,
        };
        let baseline = baseline_mean(self.data, &spec.outcome, spec.cohort_range)?;
        Ok(Stat::Value(percent_change(effect, baseline)?))
    }

    /// Fit every column of `table`, preserving column order
    ///
    /// # Errors
    /// Returns the first column error; no partial table is produced
    pub fn run_table(&self, table: &TableSpec) -> Result<TableResult> {
        table.validate(self.config.cohort_span)?;
        info!("Running {} ({} columns)", table.id, table.columns.len());
        let start = Instant::now();
        let compliance = self.compliance_for(table.columns.iter())?;

        let pb = create_column_progress_bar(
            table.columns.len() as u64,
            &table.id,
            self.config.show_progress,
        );
        let fit = |spec: &ColumnSpec| {
            let column = self.fit_column(spec, &table.rows, compliance);
            pb.inc(1);
            column
        };
        let columns = match &self.pool {
            Some(pool) => pool.install(|| {
                table
                    .columns
                    .par_iter()
                    .map(fit)
                    .collect::<Result<Vec<_>>>()
            }),
            None => table.columns.iter().map(fit).collect::<Result<Vec<_>>>(),
        };
        finish_progress_bar(&pb, Some(&format!("{} done", table.id)));
        let columns = columns?;

        info!("Finished {} in {:?}", table.id, start.elapsed());
        Ok(TableResult {
            spec: table.clone(),
            columns,
            compliance,
        })
    }
}
