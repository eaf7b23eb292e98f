//! Descriptive statistics of the core cohorts

use arrow::record_batch::RecordBatch;
use log::info;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::error::Result;
use crate::filter::Expr;
use crate::models::columns::{
    CRIME_RATE, FORMAL, HIGH_NUMBER, HN_MALVINAS, INCOME, NAVY, SERVED, UNEMPLOYMENT,
};
use crate::models::{CohortRange, Stat};
use crate::utils::arrow::float_array;

/// Variables described, in table order
pub const SUMMARY_VARIABLES: [&str; 11] = [
    HIGH_NUMBER,
    SERVED,
    CRIME_RATE,
    FORMAL,
    UNEMPLOYMENT,
    INCOME,
    "arms",
    "sexual",
    "whitecollar",
    NAVY,
    HN_MALVINAS,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub variable: String,
    /// Mean scaled by the mean cohort size
    pub number: Stat<f64>,
    pub mean: Stat<f64>,
    /// Sample standard deviation
    pub std_dev: Stat<f64>,
    pub mean_eligible: Stat<f64>,
    pub mean_exempt: Stat<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub window: CohortRange,
    pub mean_cohort_size: f64,
    pub rows: Vec<SummaryRow>,
}

fn non_missing(data: &RecordBatch, column: &str) -> Result<Vec<f64>> {
    Ok(float_array(data, column)?.iter().flatten().collect())
}

fn mean(values: &[f64]) -> Stat<f64> {
    if values.is_empty() {
        Stat::NotApplicable
    } else {
        Stat::Value(values.mean())
    }
}

fn std_dev(values: &[f64]) -> Stat<f64> {
    if values.len() < 2 {
        Stat::NotApplicable
    } else {
        Stat::Value(values.std_dev())
    }
}

/// Describe [`SUMMARY_VARIABLES`] over `window`
///
/// Missing values are ignored variable by variable.
///
/// # Errors
/// Returns a schema error if a described variable is absent
pub fn summary_table(
    data: &RecordBatch,
    window: CohortRange,
    mean_cohort_size: f64,
) -> Result<SummaryTable> {
    info!("Describing {} variables for cohorts {window}", SUMMARY_VARIABLES.len());
    let in_window = Expr::cohort_window(window).filter(data)?;
    let eligible = Expr::equals(HIGH_NUMBER, 1).filter(&in_window)?;
    let exempt = Expr::equals(HIGH_NUMBER, 0).filter(&in_window)?;

    let rows = SUMMARY_VARIABLES
        .iter()
        .map(|variable| {
            let values = non_missing(&in_window, variable)?;
            let overall = mean(&values);
            Ok(SummaryRow {
                variable: (*variable).to_string(),
                number: overall.map(|m| m * mean_cohort_size),
                mean: overall,
                std_dev: std_dev(&values),
                mean_eligible: mean(&non_missing(&eligible, variable)?),
                mean_exempt: mean(&non_missing(&exempt, variable)?),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SummaryTable {
        window,
        mean_cohort_size,
        rows,
    })
}
