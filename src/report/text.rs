//! Fixed-width text rendering of study tables
//!
//! Every table prints a label column followed by value columns, each value
//! padded to [`VALUE_WIDTH`] and followed by a [`STAR_WIDTH`] significance
//! column. Standard errors (or p-values) go on the line below their
//! estimate. Cells that do not apply to a column are left blank.

use std::fmt::{self, Display, Formatter};

use crate::algorithm::{BalanceTable, SummaryTable, TableResult};
use crate::models::Stat;

pub const LABEL_WIDTH: usize = 15;
pub const BALANCE_LABEL_WIDTH: usize = 30;
pub const SUMMARY_LABEL_WIDTH: usize = 17;
pub const VALUE_WIDTH: usize = 13;
pub const STAR_WIDTH: usize = 3;

const SIGNIFICANCE_NOTES: [&str; 3] = [
    "*** Significant at 1 percent level.",
    " ** Significant at 5 percent level.",
    "  * Significant at 10 percent level.",
];

/// Significance stars of a p-value
#[must_use]
pub fn significance(p_value: f64) -> &'static str {
    if p_value <= 0.01 {
        "***"
    } else if p_value <= 0.05 {
        "**"
    } else if p_value <= 0.1 {
        "*"
    } else {
        ""
    }
}

fn rule(f: &mut Formatter<'_>, width: usize) -> fmt::Result {
    writeln!(f, "{}", "_".repeat(width))
}

/// Write one line: a label and a `(value, stars)` pair per column
fn line<I, S>(f: &mut Formatter<'_>, label_width: usize, label: &str, cells: I) -> fmt::Result
where
    I: IntoIterator<Item = (S, &'static str)>,
    S: Display,
{
    write!(f, "{label:<label_width$}")?;
    for (value, stars) in cells {
        write!(f, "{value:>VALUE_WIDTH$}{stars:<STAR_WIDTH$}")?;
    }
    writeln!(f)
}

fn fixed(stat: Stat<f64>, precision: usize) -> String {
    match stat {
        Stat::Value(v) => format!("{v:.precision$}"),
        Stat::NotApplicable => String::new(),
    }
}

fn notes(f: &mut Formatter<'_>, notes: &[String]) -> fmt::Result {
    if let Some((first, rest)) = notes.split_first() {
        writeln!(f, "Notes: {first}")?;
        for note in rest {
            writeln!(f, "{note}")?;
        }
    }
    Ok(())
}

impl Display for TableResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let spec = &self.spec;
        let width = LABEL_WIDTH + self.columns.len() * (VALUE_WIDTH + STAR_WIDTH);

        writeln!(f, "{}", spec.title)?;
        if let Some(subtitle) = &spec.subtitle {
            writeln!(f, "{subtitle}")?;
        }
        rule(f, width)?;
        line(
            f,
            LABEL_WIDTH,
            &spec.header,
            self.columns.iter().map(|c| (c.label.as_str(), "")),
        )?;
        line(
            f,
            LABEL_WIDTH,
            "",
            (1..=self.columns.len()).map(|i| (format!("({i})"), "")),
        )?;
        rule(f, width)?;

        for (idx, row) in spec.rows.iter().enumerate() {
            let terms: Vec<_> = self.columns.iter().map(|c| c.terms[idx].stat).collect();
            line(
                f,
                LABEL_WIDTH,
                &row.label,
                terms.iter().map(|t| match t {
                    Stat::Value(t) => (format!("{:.4}", t.estimate), significance(t.p_value)),
                    Stat::NotApplicable => (String::new(), ""),
                }),
            )?;
            line(
                f,
                LABEL_WIDTH,
                "",
                terms
                    .iter()
                    .map(|t| (fixed(t.map(|t| t.std_error), 4), "")),
            )?;
        }

        if spec.reports_percent_change() {
            line(
                f,
                LABEL_WIDTH,
                "Percent change",
                self.columns.iter().map(|c| (fixed(c.percent_change, 2), "")),
            )?;
        }
        line(
            f,
            LABEL_WIDTH,
            "Controls",
            self.columns.iter().map(|c| (c.controls.label(), "")),
        )?;
        line(
            f,
            LABEL_WIDTH,
            "Observations",
            self.columns.iter().map(|c| (c.n_obs, "")),
        )?;
        line(
            f,
            LABEL_WIDTH,
            "Method",
            self.columns.iter().map(|c| (c.method.label(), "")),
        )?;
        rule(f, width)?;
        notes(f, &spec.notes)?;
        for note in SIGNIFICANCE_NOTES {
            writeln!(f, "{note}")?;
        }
        Ok(())
    }
}

impl Display for BalanceTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = BALANCE_LABEL_WIDTH + self.cohorts.len() * (VALUE_WIDTH + STAR_WIDTH);

        writeln!(
            f,
            "Table 2 - Differences in Pre-Treatment Characteristics by Birth Cohort and \
             Eligibility Group"
        )?;
        writeln!(f, "Differences by Cohort (draft exempt - draft eligible)")?;
        rule(f, width)?;
        line(
            f,
            BALANCE_LABEL_WIDTH,
            "Cohort",
            self.cohorts.years().map(|y| (y, "")),
        )?;
        rule(f, width)?;

        for row in &self.rows {
            line(
                f,
                BALANCE_LABEL_WIDTH,
                &row.label,
                row.cells.iter().map(|c| match c.test {
                    Stat::Value(t) => (format!("{:.5}", t.statistic), significance(t.p_value)),
                    Stat::NotApplicable => (String::new(), ""),
                }),
            )?;
            line(
                f,
                BALANCE_LABEL_WIDTH,
                "",
                row.cells
                    .iter()
                    .map(|c| (fixed(c.test.map(|t| t.p_value), 5), "")),
            )?;
        }
        rule(f, width)?;
        writeln!(
            f,
            "Notes: P-values are shown below test statistics. The level of observation is the \
             cohort-ID number combination."
        )
    }
}

impl Display for SummaryTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let width = SUMMARY_LABEL_WIDTH + 5 * (VALUE_WIDTH + STAR_WIDTH);
        let headers = ["Number", "Mean", "St. dev.", "Mean eligible", "Mean exempt"];

        writeln!(
            f,
            "Table B.1 - Descriptive Statistics of Selected Variables of Interest for Male \
             Birth Cohorts {}",
            self.window
        )?;
        rule(f, width)?;
        line(
            f,
            SUMMARY_LABEL_WIDTH,
            "",
            (1..=headers.len()).map(|i| (format!("({i})"), "")),
        )?;
        line(f, SUMMARY_LABEL_WIDTH, "", headers.iter().map(|h| (*h, "")))?;
        rule(f, width)?;

        for row in &self.rows {
            let values = [
                row.number,
                row.mean,
                row.std_dev,
                row.mean_eligible,
                row.mean_exempt,
            ];
            line(
                f,
                SUMMARY_LABEL_WIDTH,
                &row.variable,
                values.iter().map(|v| {
                    let precision = match v {
                        Stat::Value(x) if *x >= 100.0 => 0,
                        _ => 4,
                    };
                    (fixed(*v, precision), "")
                }),
            )?;
        }
        rule(f, width)?;
        writeln!(
            f,
            "Notes: Number is the mean scaled by a mean cohort size of {:.0}.",
            self.mean_cohort_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{
        ColumnSpec, ColumnStatistics, Controls, Method, TableSpec, TermStatistic,
    };
    use crate::estimate::TermEstimate;
    use crate::models::CORE_COHORTS;

    #[test]
    fn test_significance_thresholds() {
        assert_eq!(significance(0.01), "***");
        assert_eq!(significance(0.011), "**");
        assert_eq!(significance(0.05), "**");
        assert_eq!(significance(0.1), "*");
        assert_eq!(significance(0.2), "");
    }

    fn column(method: Method, stat: Stat<TermEstimate>) -> ColumnStatistics {
        ColumnStatistics {
            label: "1958-1962".to_string(),
            method,
            controls: Controls::Without,
            cohort_range: CORE_COHORTS,
            outcome: "crimerate".to_string(),
            terms: vec![TermStatistic {
                name: "highnumber".to_string(),
                stat,
            }],
            n_obs: 5000,
            percent_change: Stat::NotApplicable,
            first_stage_f: None,
        }
    }

    #[test]
    fn test_render_regression_table() {
        let spec = TableSpec::new("t", "Test Table")
            .with_column(ColumnSpec::ols(CORE_COHORTS))
            .with_column(ColumnSpec::iv(CORE_COHORTS))
            .with_row("Draft Eligible", "highnumber")
            .with_note("First note.");
        let estimate = TermEstimate {
            estimate: 0.0021,
            std_error: 0.0009,
            p_value: 0.02,
        };
        let result = TableResult {
            spec,
            columns: vec![
                column(Method::Ols, Stat::Value(estimate)),
                column(Method::Iv, Stat::NotApplicable),
            ],
            compliance: None,
        };
        let text = result.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Test Table");
        assert_eq!(lines[1], "_".repeat(15 + 2 * 16));
        assert_eq!(
            lines[2],
            format!("{:<15}{:>13}{:<3}{:>13}{:<3}", "Cohort", "1958-1962", "", "1958-1962", "")
        );
        let eligible = lines
            .iter()
            .find(|l| l.starts_with("Draft Eligible"))
            .unwrap();
        assert_eq!(
            *eligible,
            format!("{:<15}{:>13}{:<3}{:>13}{:<3}", "Draft Eligible", "0.0021", "**", "", "")
        );
        assert!(text.contains("Percent change"));
        assert!(text.contains("Notes: First note."));
        assert!(lines.iter().any(|l| l.starts_with("Method") && l.contains("2SLS")));
    }
}
