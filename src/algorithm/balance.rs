//! Balance of pre-treatment characteristics across eligibility groups
//!
//! For each core cohort, compares the origin shares of draft-exempt and
//! draft-eligible individuals with a Welch t-test. Lottery assignment is
//! random, so large statistics point at a data problem rather than an
//! effect.

use arrow::record_batch::RecordBatch;
use log::{info, warn};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::estimate::{TTest, welch_t_test};
use crate::filter::Expr;
use crate::models::columns::{ARGENTINE, COHORT, HIGH_NUMBER, INDIGENOUS, NATURALIZED};
use crate::models::{CohortRange, Stat};
use crate::utils::arrow::float_array;

/// Characteristics compared across groups, with their row labels
pub const BALANCE_VARIABLES: [(&str, &str); 3] = [
    (ARGENTINE, "Argentine-born, not indigenous"),
    (INDIGENOUS, "Argentine-born, indigenous"),
    (NATURALIZED, "Born abroad, naturalized"),
];

/// Test of one characteristic in one cohort
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceCell {
    pub cohort: i32,
    /// Exempt minus eligible
    pub test: Stat<TTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceRow {
    pub variable: String,
    pub label: String,
    pub cells: Vec<BalanceCell>,
}

/// Balance tests by cohort
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceTable {
    pub cohorts: CohortRange,
    pub rows: Vec<BalanceRow>,
}

/// Non-missing values of `column` for one cohort and eligibility group
fn group_values(data: &RecordBatch, column: &str, cohort: i32, eligible: i32) -> Result<Vec<f64>> {
    let rows = Expr::And(vec![
        Expr::equals(COHORT, cohort),
        Expr::equals(HIGH_NUMBER, eligible),
    ])
    .filter(data)?;
    Ok(float_array(&rows, column)?.iter().flatten().collect())
}

/// Test every balance characteristic in every cohort of `cohorts`
///
/// A cohort where a test is undefined (too few observations, or no
/// variation in either group) gets a `NotApplicable` cell.
///
/// # Errors
/// Returns a schema error if an origin column is missing
pub fn balance_table(data: &RecordBatch, cohorts: CohortRange) -> Result<BalanceTable> {
    info!("Testing origin balance for cohorts {cohorts}");
    let rows = BALANCE_VARIABLES
        .iter()
        .map(|(variable, label)| {
            let cells = cohorts
                .years()
                .map(|cohort| {
                    let exempt = group_values(data, variable, cohort, 0)?;
                    let eligible = group_values(data, variable, cohort, 1)?;
                    let test = match welch_t_test(&exempt, &eligible) {
                        Ok(test) => Stat::Value(test),
                        Err(Error::Fit(reason)) => {
                            warn!("No balance test for {variable} in {cohort}: {reason}");
                            Stat::NotApplicable
                        }
                        Err(e) => return Err(e),
                    };
                    Ok(BalanceCell { cohort, test })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(BalanceRow {
                variable: (*variable).to_string(),
                label: (*label).to_string(),
                cells,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BalanceTable { cohorts, rows })
}
