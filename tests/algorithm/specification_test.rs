use draft_lottery::algorithm::{RegressorSet, sample_filter};
use draft_lottery::models::columns::control_regressors;
use draft_lottery::tables::regression_tables;
use draft_lottery::{
    CORE_COHORTS, CohortRange, ColumnSpec, Controls, Error, FULL_SPAN, Method, SampleBuilder,
};

use crate::utils::derived_dataset;

fn core_dummies() -> Vec<String> {
    CORE_COHORTS.dummies_without_baseline()
}

#[test]
fn test_ols_regressors() {
    let set = RegressorSet::select(Method::Ols, Controls::Without, &core_dummies(), &[]);
    assert_eq!(
        set.exogenous,
        vec![
            "highnumber",
            "cohort_1959",
            "cohort_1960",
            "cohort_1961",
            "cohort_1962",
            "constant"
        ]
    );
    assert!(set.endogenous.is_none());
    assert!(set.instrument.is_none());
}

#[test]
fn test_iv_regressors_with_controls() {
    let set = RegressorSet::select(Method::Iv, Controls::With, &core_dummies(), &[]);
    assert_eq!(set.exogenous.len(), 1 + 4 + control_regressors().len());
    assert_eq!(set.exogenous[0], "constant");
    assert_eq!(set.exogenous[5], "naturalized");
    assert_eq!(set.endogenous.as_deref(), Some("sm"));
    assert_eq!(set.instrument.as_deref(), Some("highnumber"));
    assert!(!set.exogenous.iter().any(|c| c == "highnumber" || c == "sm"));
    assert_eq!(set.columns().last(), Some(&"highnumber"));
}

#[test]
fn test_selection_is_pure() {
    for method in [Method::Ols, Method::Iv] {
        for controls in [Controls::Without, Controls::With] {
            let first = RegressorSet::select(method, controls, &core_dummies(), &[]);
            let second = RegressorSet::select(method, controls, &core_dummies(), &[]);
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_extra_regressor_position() {
    let extra = vec!["navy".to_string()];
    let ols = RegressorSet::select(Method::Ols, Controls::Without, &core_dummies(), &extra);
    assert_eq!(ols.exogenous[1], "navy");
    let iv = RegressorSet::select(Method::Iv, Controls::Without, &core_dummies(), &extra);
    assert_eq!(iv.exogenous[5], "navy");
}

#[test]
fn test_parse_flags() {
    assert_eq!("iv".parse::<Method>().ok(), Some(Method::Iv));
    assert_eq!("2SLS".parse::<Method>().ok(), Some(Method::Iv));
    assert_eq!(" ols ".parse::<Method>().ok(), Some(Method::Ols));
    assert!(matches!("probit".parse::<Method>(), Err(Error::Specification(_))));
    assert_eq!("y".parse::<Controls>().ok(), Some(Controls::With));
    assert_eq!("No".parse::<Controls>().ok(), Some(Controls::Without));
    assert!(matches!("maybe".parse::<Controls>(), Err(Error::Specification(_))));
}

#[test]
fn test_invalid_columns() {
    let baseline = ColumnSpec::ols(CORE_COHORTS).with_dummies(CORE_COHORTS);
    assert!(baseline.validate(CORE_COHORTS).is_err());
    assert!(baseline.validate(FULL_SPAN).is_ok());

    let outside = ColumnSpec::ols(FULL_SPAN).with_dummies(CohortRange::new(1960, 1970));
    assert!(matches!(outside.validate(FULL_SPAN), Err(Error::Specification(_))));

    let empty = ColumnSpec::ols(CohortRange::new(1962, 1958));
    assert!(matches!(empty.validate(FULL_SPAN), Err(Error::Specification(_))));
}

#[test]
fn test_sample_filter_restricts_window() -> draft_lottery::Result<()> {
    let data = derived_dataset(30);
    let spec = ColumnSpec::iv(CORE_COHORTS);
    let filtered = sample_filter(&spec).filter(&data)?;
    // Service is recorded for every core cohort row
    assert_eq!(filtered.num_rows(), 5 * 30);
    Ok(())
}

#[test]
fn test_every_published_column_builds() -> draft_lottery::Result<()> {
    let data = derived_dataset(40);
    let builder = SampleBuilder::new(FULL_SPAN);
    for table in regression_tables() {
        for column in &table.columns {
            let sample = builder.build(&data, column)?;
            assert_eq!(sample.n_obs(), column.cohort_range.len() * 40, "{}", table.id);
        }
    }
    Ok(())
}
