//! Column names of the lottery dataset
//!
//! Raw columns are supplied by the input file; derived columns are appended
//! by the variable deriver.

/// Birth year
pub const COHORT: &str = "cohort";
/// Lottery-assigned draft number
pub const DRAFT_NUMBER: &str = "draftnumber";
/// Draft eligibility (the instrument)
pub const HIGH_NUMBER: &str = "highnumber";
/// Actual service (the endogenous regressor)
pub const SERVED: &str = "sm";
/// Overall crime rate
pub const CRIME_RATE: &str = "crimerate";
/// Eligible while the Falklands war was fought
pub const MALVINAS: &str = "malvinas";
/// Eligible to serve in the navy
pub const NAVY: &str = "navy";

/// Origin: Argentine-born, not indigenous (the omitted baseline)
pub const ARGENTINE: &str = "argentine";
/// Origin: born abroad, naturalized
pub const NATURALIZED: &str = "naturalized";
/// Origin: Argentine-born, indigenous
pub const INDIGENOUS: &str = "indigenous";

/// Formal job-market participation
pub const FORMAL: &str = "formal";
/// Unemployment rate
pub const UNEMPLOYMENT: &str = "unemployment";
/// Hourly earnings
pub const INCOME: &str = "income";

/// Regression intercept (derived)
pub const CONSTANT: &str = "constant";
/// `highnumber * malvinas` (derived)
pub const HN_MALVINAS: &str = "hn_malvinas";

/// Crime-type outcomes, in table order
pub const CRIME_TYPES: [&str; 7] = [
    "arms",
    "property",
    "sexual",
    "murder",
    "threat",
    "drug",
    "whitecollar",
];

/// Origin dummies used as controls (`argentine` omitted)
pub const ORIGIN_CONTROLS: [&str; 2] = [NATURALIZED, INDIGENOUS];

/// Number of districts the country is divided into
pub const DISTRICT_COUNT: u8 = 24;

const COHORT_DUMMY_PREFIX: &str = "cohort_";

/// Name of the dummy for birth year `year`
#[must_use]
pub fn cohort_dummy(year: i32) -> String {
    format!("{COHORT_DUMMY_PREFIX}{year}")
}

/// Birth year encoded in a cohort dummy name, if it is one
#[must_use]
pub fn parse_cohort_dummy(name: &str) -> Option<i32> {
    name.strip_prefix(COHORT_DUMMY_PREFIX)?.parse().ok()
}

/// Name of the dummy for district `district`
#[must_use]
pub fn district_dummy(district: u8) -> String {
    format!("dist{district}")
}

/// District dummies used as controls (`dist1` omitted)
#[must_use]
pub fn district_controls() -> Vec<String> {
    (2..=DISTRICT_COUNT).map(district_dummy).collect()
}

/// Origin and district controls, in regressor order
#[must_use]
pub fn control_regressors() -> Vec<String> {
    ORIGIN_CONTROLS
        .iter()
        .map(|name| (*name).to_string())
        .chain(district_controls())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_dummy_names() {
        assert_eq!(cohort_dummy(1929), "cohort_1929");
        assert_eq!(parse_cohort_dummy("cohort_1962"), Some(1962));
        assert_eq!(parse_cohort_dummy("dist3"), None);
        assert_eq!(parse_cohort_dummy("cohort_x"), None);
    }

    #[test]
    fn test_controls() {
        let districts = district_controls();
        assert_eq!(districts.len(), 23);
        assert_eq!(districts[0], "dist2");
        assert_eq!(districts[22], "dist24");

        let controls = control_regressors();
        assert_eq!(controls.len(), 25);
        assert_eq!(&controls[..2], &["naturalized", "indigenous"]);
    }
}
