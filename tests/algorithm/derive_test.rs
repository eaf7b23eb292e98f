use arrow::array::Array;
use draft_lottery::models::columns::{CONSTANT, HN_MALVINAS, cohort_dummy};
use draft_lottery::utils::arrow::{float_array, int_array};
use draft_lottery::utils::{SyntheticConfig, generate_dataset};
use draft_lottery::{FULL_SPAN, MissingCohortPolicy, StudyConfig, VariableDeriver};

use crate::utils::{derived_dataset, raw_dataset, synthetic};

#[test]
fn test_exactly_one_dummy_per_row() -> draft_lottery::Result<()> {
    let derived = derived_dataset(20);
    let dummies = FULL_SPAN
        .years()
        .map(|year| float_array(&derived, &cohort_dummy(year)))
        .collect::<draft_lottery::Result<Vec<_>>>()?;

    for row in 0..derived.num_rows() {
        let total: f64 = dummies.iter().map(|d| d.value(row)).sum();
        assert_eq!(total, 1.0, "row {row} has {total} cohort dummies set");
    }
    Ok(())
}

#[test]
fn test_dummy_matches_cohort() -> draft_lottery::Result<()> {
    let derived = derived_dataset(10);
    let cohort = int_array(&derived, "cohort")?;
    let d1960 = float_array(&derived, &cohort_dummy(1960))?;
    for row in 0..derived.num_rows() {
        let expected = if cohort.value(row) == 1960 { 1.0 } else { 0.0 };
        assert_eq!(d1960.value(row), expected);
    }
    Ok(())
}

#[test]
fn test_raw_columns_untouched() -> draft_lottery::Result<()> {
    let raw = raw_dataset(10);
    let derived = derived_dataset(10);
    assert_eq!(derived.num_rows(), raw.num_rows());
    // 37 dummies, constant and the war interaction
    assert_eq!(derived.num_columns(), raw.num_columns() + 37 + 2);
    for field in raw.schema().fields() {
        let idx = raw.schema().index_of(field.name())?;
        assert_eq!(derived.column(idx), raw.column(idx), "{} changed", field.name());
    }

    let constant = float_array(&derived, CONSTANT)?;
    assert!(constant.values().iter().all(|v| *v == 1.0));
    Ok(())
}

#[test]
fn test_war_interaction() -> draft_lottery::Result<()> {
    let derived = derived_dataset(50);
    let cohort = int_array(&derived, "cohort")?;
    let highnumber = float_array(&derived, "highnumber")?;
    let interaction = float_array(&derived, HN_MALVINAS)?;

    for row in 0..derived.num_rows() {
        let war = matches!(cohort.value(row), 1962 | 1963);
        let expected = if war { highnumber.value(row) } else { 0.0 };
        assert_eq!(interaction.value(row), expected);
    }
    Ok(())
}

#[test]
fn test_missing_cohort_policies() -> draft_lottery::Result<()> {
    let raw = generate_dataset(&SyntheticConfig {
        missing_rate: 0.2,
        ..synthetic(20)
    })?;
    let cohort = int_array(&raw, "cohort")?;
    assert!(cohort.null_count() > 0);

    let propagate = VariableDeriver::new(FULL_SPAN, MissingCohortPolicy::Propagate).derive(&raw)?;
    let legacy = VariableDeriver::new(FULL_SPAN, MissingCohortPolicy::LegacyZero).derive(&raw)?;
    let name = cohort_dummy(1940);
    let propagated = float_array(&propagate, &name)?;
    let zeroed = float_array(&legacy, &name)?;

    assert_eq!(propagated.null_count(), cohort.null_count());
    assert_eq!(zeroed.null_count(), 0);
    for row in (0..raw.num_rows()).filter(|row| cohort.is_null(*row)) {
        assert_eq!(zeroed.value(row), 0.0);
    }
    Ok(())
}

#[test]
fn test_deriving_twice_is_stable() -> draft_lottery::Result<()> {
    let deriver = VariableDeriver::from_config(&StudyConfig::default());
    let once = deriver.derive(&raw_dataset(5))?;
    let twice = deriver.derive(&once)?;
    assert_eq!(once, twice);
    Ok(())
}
