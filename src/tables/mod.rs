//! Regression tables of the study
//!
//! Each function returns the declarative [`TableSpec`] of one published
//! table. All of them are run by the same
//! [`RegressionRunner`](crate::algorithm::RegressionRunner).

use crate::algorithm::{ColumnSpec, Controls, EffectScaling, TableSpec};
use crate::models::columns::{
    CONSTANT, CRIME_TYPES, FORMAL, HIGH_NUMBER, HN_MALVINAS, INCOME, NAVY, SERVED, UNEMPLOYMENT,
};
use crate::models::{CORE_COHORTS, CohortRange, FULL_SPAN};

const ROBUST_NOTE: &str = "Robust standard errors are shown below estimates. The level of \
     observation is the cohort-ID number combination.";
const INSTRUMENT_NOTE: &str = "The instrument for Conscription is Draft Eligible.";

/// Display name of a crime-type outcome
fn crime_label(crime: &str) -> &str {
    match crime {
        "arms" => "Weapons",
        "property" => "Property",
        "sexual" => "Sexual Attack",
        "murder" => "Murder",
        "threat" => "Threat",
        "drug" => "Drug Traff.",
        "whitecollar" => "White Collar",
        other => other,
    }
}

/// First stage: service on eligibility, pooled and by cohort
#[must_use]
pub fn table_3() -> TableSpec {
    let first_stage =
        |spec: ColumnSpec| spec.with_outcome(SERVED).with_scaling(EffectScaling::None);
    TableSpec::new("table_3", "Table 3 - First Stage by Birth Cohort")
        .with_subtitle("Dependent Variable: Conscription")
        .with_column(first_stage(ColumnSpec::ols(CORE_COHORTS)))
        .with_columns(
            CORE_COHORTS
                .years()
                .map(|year| first_stage(ColumnSpec::ols(CohortRange::single(year)))),
        )
        .with_row("Draft Eligible", HIGH_NUMBER)
        .with_row("Constant", CONSTANT)
        .with_note(ROBUST_NOTE)
        .with_note("Column 1 includes cohort dummies.")
}

/// Main estimates: intention to treat and 2SLS, core and extended cohorts
#[must_use]
pub fn table_4() -> TableSpec {
    TableSpec::new(
        "table_4",
        "Table 4 - Estimated Impact of Conscription on Crime Rates",
    )
    .with_column(ColumnSpec::ols(CORE_COHORTS))
    .with_column(ColumnSpec::ols(CORE_COHORTS).with_controls(Controls::With))
    .with_column(ColumnSpec::iv(CORE_COHORTS))
    .with_column(ColumnSpec::iv(CORE_COHORTS).with_controls(Controls::With))
    .with_column(ColumnSpec::ols(FULL_SPAN))
    .with_column(ColumnSpec::ols(CohortRange::new(1929, 1955)))
    .with_column(ColumnSpec::ols(CohortRange::new(1958, 1965)))
    .with_row("Draft Eligible", HIGH_NUMBER)
    .with_row("Conscription", SERVED)
    .with_note(ROBUST_NOTE)
    .with_note(
        "All models include cohort dummies. Columns 2 and 4 control for origin and district.",
    )
    .with_note(INSTRUMENT_NOTE)
    .with_note(
        "Percent change is 100 x Estimate / mean crime rate of draft-exempt men for 2SLS \
         models and 100 x Wald estimate / mean crime rate of draft-exempt men for \
         intention-to-treat models.",
    )
    .with_note(
        "The Wald estimate is ITT / (p1 - p2) with compliance rates measured over the \
         1958-1962 cohorts.",
    )
}

/// Peacetime versus wartime and navy versus army service
#[must_use]
pub fn table_5() -> TableSpec {
    let windows = [FULL_SPAN, CohortRange::new(1958, 1965)];
    let columns = [HN_MALVINAS, NAVY].into_iter().flat_map(|extra| {
        windows.into_iter().map(move |window| {
            ColumnSpec::ols(window)
                .with_extra(extra)
                .with_scaling(EffectScaling::None)
        })
    });
    TableSpec::new(
        "table_5",
        "Table 5 - Estimated Impact of Conscription on Crime Rates for Peacetime",
    )
    .with_subtitle("versus Wartime Service and 1-Year versus 2-Year Service")
    .with_columns(columns)
    .with_row("Draft Eligible", HIGH_NUMBER)
    .with_row("War Eligible", HN_MALVINAS)
    .with_row("Navy Eligible", NAVY)
    .with_note(ROBUST_NOTE)
    .with_note("War Eligible is one for the draft eligible of the 1962 and 1963 cohorts.")
    .with_note("Navy Eligible is one for ID numbers eligible to serve in the Navy.")
    .with_note("All models include cohort dummies.")
}

/// 2SLS by type of crime
#[must_use]
pub fn table_6() -> TableSpec {
    TableSpec::new(
        "table_6",
        "Table 6 - Estimated Impact of Conscription on Crime Rates, by Type of Crime",
    )
    .with_header("Dependent Var.")
    .with_columns(CRIME_TYPES.iter().map(|crime| {
        ColumnSpec::iv(CORE_COHORTS)
            .with_outcome(crime)
            .with_label(crime_label(crime))
    }))
    .with_row("Conscription", SERVED)
    .with_note(ROBUST_NOTE)
    .with_note("All models include cohort dummies.")
    .with_note(INSTRUMENT_NOTE)
    .with_note("Percent change is 100 x Estimate / mean outcome of draft-exempt men.")
}

/// 2SLS on labour-market outcomes
#[must_use]
pub fn table_7() -> TableSpec {
    let outcomes = [
        (FORMAL, "Formal job"),
        (UNEMPLOYMENT, "Unemployment"),
        (INCOME, "Earnings"),
    ];
    TableSpec::new(
        "table_7",
        "Table 7 - Estimated Impact of Conscription on Labour Market Outcomes",
    )
    .with_header("Dependent Var.")
    .with_columns(outcomes.into_iter().map(|(outcome, label)| {
        ColumnSpec::iv(CORE_COHORTS)
            .with_outcome(outcome)
            .with_label(label)
    }))
    .with_row("Conscription", SERVED)
    .with_note(ROBUST_NOTE)
    .with_note(
        "Formal job market participation is as of 2004; unemployment and hourly earnings \
         are as of 2003.",
    )
    .with_note("All models include cohort dummies.")
    .with_note(INSTRUMENT_NOTE)
    .with_note("Percent change is 100 x Estimate / mean outcome of draft-exempt men.")
}

/// 2SLS for each core cohort separately
#[must_use]
pub fn table_e4(controls: Controls) -> TableSpec {
    let (id, title) = match controls {
        Controls::Without => (
            "table_e4",
            "Table E.4 - Estimated Impact of Conscription on Crime Rates, by Core Cohort",
        ),
        Controls::With => (
            "table_e4_controls",
            "Table E.4 - Estimated Impact of Conscription on Crime Rates, by Core Cohort \
             with Controls",
        ),
    };
    TableSpec::new(id, title)
        .with_subtitle("Dependent Variable: Crime Rate")
        .with_columns(
            CORE_COHORTS
                .years()
                .map(|year| ColumnSpec::iv(CohortRange::single(year)).with_controls(controls)),
        )
        .with_row("Conscription", SERVED)
        .with_note(ROBUST_NOTE)
        .with_note(INSTRUMENT_NOTE)
}

/// Every regression table, in publication order
#[must_use]
pub fn regression_tables() -> Vec<TableSpec> {
    vec![
        table_3(),
        table_4(),
        table_5(),
        table_6(),
        table_7(),
        table_e4(Controls::Without),
        table_e4(Controls::With),
    ]
}

/// Look up a regression table by identifier
#[must_use]
pub fn table_by_id(id: &str) -> Option<TableSpec> {
    regression_tables().into_iter().find(|t| t.id == id)
}
