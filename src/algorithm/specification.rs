//! Regression specifications
//!
//! A [`ColumnSpec`] describes one column of one table: estimator, cohort
//! window, cohort dummies, controls, extra regressors and outcome. The
//! regressors it implies are selected by [`RegressorSet::select`], a pure
//! function of method and controls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::CohortRange;
use crate::models::columns::{
    CONSTANT, CRIME_RATE, HIGH_NUMBER, SERVED, control_regressors, parse_cohort_dummy,
};

/// Estimator used for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Ordinary least squares on the eligibility dummy (intention to treat)
    Ols,
    /// Two-stage least squares with service instrumented by eligibility
    Iv,
}

impl Method {
    /// Regressor whose effect a column reports
    #[must_use]
    pub const fn focal_term(self) -> &'static str {
        match self {
            Self::Ols => HIGH_NUMBER,
            Self::Iv => SERVED,
        }
    }

    /// Label used in the method row of a rendered table
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ols => "OLS",
            Self::Iv => "2SLS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OLS" => Ok(Self::Ols),
            "IV" | "2SLS" => Ok(Self::Iv),
            other => Err(Error::Specification(format!(
                "Unknown method '{other}', expected OLS or IV"
            ))),
        }
    }
}

/// Whether origin and district controls enter the regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Controls {
    #[default]
    Without,
    With,
}

impl Controls {
    /// Label used in the controls row of a rendered table
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Without => "No",
            Self::With => "Yes",
        }
    }
}

impl FromStr for Controls {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(Self::With),
            "n" | "no" => Ok(Self::Without),
            other => Err(Error::Specification(format!(
                "Invalid controls flag '{other}', expected yes or no"
            ))),
        }
    }
}

/// How the focal coefficient is turned into a percent change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectScaling {
    /// Divide by the compliance difference of the reference window first
    Wald,
    /// Use the coefficient as the effect of service
    Direct,
    /// No percent change is reported
    None,
}

impl EffectScaling {
    /// Scaling a column of `method` reports by default
    #[must_use]
    pub const fn default_for(method: Method) -> Self {
        match method {
            Method::Ols => Self::Wald,
            Method::Iv => Self::Direct,
        }
    }
}

/// Regressors of one column
///
/// For OLS `exogenous` is the full design and there is neither an
/// endogenous regressor nor an instrument. For IV `exogenous` holds the
/// included instruments, `endogenous` is `sm` and `instrument` is
/// `highnumber`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegressorSet {
    pub exogenous: Vec<String>,
    pub endogenous: Option<String>,
    pub instrument: Option<String>,
}

impl RegressorSet {
    /// Select the regressors implied by method and controls
    ///
    /// Extra regressors follow `highnumber` in an OLS design and the cohort
    /// dummies in the IV exogenous block.
    #[must_use]
    pub fn select(
        method: Method,
        controls: Controls,
        cohort_dummies: &[String],
        extra_regressors: &[String],
    ) -> Self {
        let control_columns = match controls {
            Controls::With => control_regressors(),
            Controls::Without => Vec::new(),
        };

        match method {
            Method::Ols => {
                let exogenous = std::iter::once(HIGH_NUMBER.to_string())
                    .chain(extra_regressors.iter().cloned())
                    .chain(cohort_dummies.iter().cloned())
                    .chain(control_columns)
                    .chain(std::iter::once(CONSTANT.to_string()))
                    .collect();
                Self {
                    exogenous,
                    endogenous: None,
                    instrument: None,
                }
            }
            Method::Iv => {
                let exogenous = std::iter::once(CONSTANT.to_string())
                    .chain(cohort_dummies.iter().cloned())
                    .chain(extra_regressors.iter().cloned())
                    .chain(control_columns)
                    .collect();
                Self {
                    exogenous,
                    endogenous: Some(SERVED.to_string()),
                    instrument: Some(HIGH_NUMBER.to_string()),
                }
            }
        }
    }

    /// Every column the regressors read, in design order
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.exogenous
            .iter()
            .map(String::as_str)
            .chain(self.endogenous.as_deref())
            .chain(self.instrument.as_deref())
            .collect()
    }
}

/// Declarative description of one table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column header, e.g. the cohort window or the outcome
    pub label: String,
    pub method: Method,
    pub cohort_range: CohortRange,
    /// Cohort dummies entering the regression
    pub cohort_dummies: Vec<String>,
    pub controls: Controls,
    pub extra_regressors: Vec<String>,
    /// Dependent variable
    pub outcome: String,
    pub scaling: EffectScaling,
}

impl ColumnSpec {
    /// Column of `method` over `range`
    ///
    /// Defaults: the window's own dummies without its first cohort, no
    /// controls, crime rate as outcome and the method's usual scaling.
    #[must_use]
    pub fn new(method: Method, cohort_range: CohortRange) -> Self {
        Self {
            label: cohort_range.to_string(),
            method,
            cohort_range,
            cohort_dummies: cohort_range.dummies_without_baseline(),
            controls: Controls::Without,
            extra_regressors: Vec::new(),
            outcome: CRIME_RATE.to_string(),
            scaling: EffectScaling::default_for(method),
        }
    }

    /// OLS column over `range`
    #[must_use]
    pub fn ols(cohort_range: CohortRange) -> Self {
        Self::new(Method::Ols, cohort_range)
    }

    /// IV column over `range`
    #[must_use]
    pub fn iv(cohort_range: CohortRange) -> Self {
        Self::new(Method::Iv, cohort_range)
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replace the cohort dummies with those of `years`
    #[must_use]
    pub fn with_dummies(mut self, years: CohortRange) -> Self {
        self.cohort_dummies = years.dummy_names();
        self
    }

    #[must_use]
    pub fn without_dummies(mut self) -> Self {
        self.cohort_dummies.clear();
        self
    }

    #[must_use]
    pub fn with_controls(mut self, controls: Controls) -> Self {
        self.controls = controls;
        self
    }

    #[must_use]
    pub fn with_extra(mut self, regressor: &str) -> Self {
        self.extra_regressors.push(regressor.to_string());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: &str) -> Self {
        self.outcome = outcome.to_string();
        self
    }

    #[must_use]
    pub fn with_scaling(mut self, scaling: EffectScaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Regressors implied by this column
    #[must_use]
    pub fn regressors(&self) -> RegressorSet {
        RegressorSet::select(
            self.method,
            self.controls,
            &self.cohort_dummies,
            &self.extra_regressors,
        )
    }

    /// Check the column against the cohort span of the derived dataset
    ///
    /// # Errors
    /// Returns a specification error if the window is empty, a dummy name is
    /// malformed, names the baseline cohort or a year outside `span`, or if
    /// Wald scaling is requested for an IV column
    pub fn validate(&self, span: CohortRange) -> Result<()> {
        if !self.cohort_range.is_valid() {
            return Err(Error::Specification(format!(
                "Empty cohort window {}-{}",
                self.cohort_range.first, self.cohort_range.last
            )));
        }
        for dummy in &self.cohort_dummies {
            let year = parse_cohort_dummy(dummy).ok_or_else(|| {
                Error::Specification(format!("'{dummy}' is not a cohort dummy"))
            })?;
            if year == span.first {
                return Err(Error::Specification(format!(
                    "Baseline cohort dummy '{dummy}' cannot enter a regression"
                )));
            }
            if !span.contains(year) {
                return Err(Error::Specification(format!(
                    "Cohort dummy '{dummy}' is outside the cohort span {span}"
                )));
            }
        }
        if self.method == Method::Iv && self.scaling == EffectScaling::Wald {
            return Err(Error::Specification(
                "Wald scaling applies to intention-to-treat columns only".to_string(),
            ));
        }
        Ok(())
    }
}

/// A labelled coefficient row of a regression table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRow {
    pub label: String,
    /// Regressor whose estimate fills the row
    pub term: String,
}

impl TermRow {
    #[must_use]
    pub fn new(label: &str, term: &str) -> Self {
        Self {
            label: label.to_string(),
            term: term.to_string(),
        }
    }
}

/// Declarative description of a regression table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Short identifier, e.g. `table_4`
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    /// Label of the header row holding the column labels
    pub header: String,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<TermRow>,
    pub notes: Vec<String>,
}

impl TableSpec {
    #[must_use]
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: None,
            header: "Cohort".to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = header.to_string();
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = ColumnSpec>) -> Self {
        self.columns.extend(columns);
        self
    }

    #[must_use]
    pub fn with_row(mut self, label: &str, term: &str) -> Self {
        self.rows.push(TermRow::new(label, term));
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.notes.push(note.to_string());
        self
    }

    /// Whether any column reports a percent change
    #[must_use]
    pub fn reports_percent_change(&self) -> bool {
        self.columns.iter().any(|c| c.scaling != EffectScaling::None)
    }

    /// Validate every column against the cohort span
    ///
    /// # Errors
    /// Returns the first column's specification error
    pub fn validate(&self, span: CohortRange) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::Specification(format!("{} has no columns", self.id)));
        }
        self.columns.iter().try_for_each(|c| c.validate(span))
    }
}
