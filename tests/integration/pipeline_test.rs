use draft_lottery::algorithm::ComplianceRates;
use draft_lottery::tables::{table_3, table_4, table_by_id};
use draft_lottery::{
    CORE_COHORTS, LinearEstimator, RegressionRunner, Stat, StudyConfig, StudyReport,
    balance_table, regression_tables, summary_table, write_json,
};

use crate::utils::{derived_dataset, scratch_dir, test_config};

const ROWS_PER_COHORT: usize = 1000;

fn estimate(stat: Stat<draft_lottery::estimate::TermEstimate>) -> f64 {
    stat.value().map(|t| t.estimate).unwrap_or(f64::NAN)
}

#[test]
fn test_compliance_rates() -> draft_lottery::Result<()> {
    let data = derived_dataset(ROWS_PER_COHORT);
    let rates = ComplianceRates::from_data(&data, CORE_COHORTS)?;
    assert!((rates.p1 - 0.66).abs() < 0.03, "p1 = {}", rates.p1);
    assert!((rates.p2 - 0.04).abs() < 0.02, "p2 = {}", rates.p2);
    Ok(())
}

#[test]
fn test_first_stage() -> draft_lottery::Result<()> {
    let data = derived_dataset(ROWS_PER_COHORT);
    let config = test_config();
    let runner = RegressionRunner::new(&data, LinearEstimator::default(), &config)?;
    let result = runner.run_table(&table_3())?;

    assert_eq!(result.columns.len(), 6);
    let pooled = estimate(result.columns[0].term("highnumber"));
    assert!((pooled - 0.62).abs() < 0.03, "first stage {pooled}");
    assert!(result.columns.iter().all(|c| c.percent_change == Stat::NotApplicable));
    assert_eq!(result.columns[1].label, "1958");
    assert_eq!(result.columns[1].n_obs, ROWS_PER_COHORT);
    Ok(())
}

#[test]
fn test_main_estimates_recover_service_effect() -> draft_lottery::Result<()> {
    let data = derived_dataset(ROWS_PER_COHORT);
    let config = test_config();
    let runner = RegressionRunner::new(&data, LinearEstimator::default(), &config)?;
    let result = runner.run_table(&table_4())?;

    let labels: Vec<&str> = result.columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "1958-1962",
            "1958-1962",
            "1958-1962",
            "1958-1962",
            "1929-1965",
            "1929-1955",
            "1958-1965"
        ]
    );
    let n_obs: Vec<usize> = result.columns.iter().map(|c| c.n_obs).collect();
    assert_eq!(
        n_obs,
        [5, 5, 5, 5, 37, 27, 8].map(|cohorts| cohorts * ROWS_PER_COHORT).to_vec()
    );

    for column in &result.columns[2..4] {
        let effect = estimate(column.term("sm"));
        assert!((effect - 0.003).abs() < 0.0015, "2SLS estimate {effect}");
        assert_eq!(column.term("highnumber"), Stat::NotApplicable);
        assert!(column.first_stage_f.is_some_and(|f| f > 100.0));
    }

    // Intention to treat is the effect diluted by the compliance difference
    let itt = estimate(result.columns[0].term("highnumber"));
    assert!((itt - 0.62 * 0.003).abs() < 0.001, "ITT estimate {itt}");
    for column in &result.columns {
        let change = column.percent_change.value().copied().unwrap_or(f64::NAN);
        assert!(change > 0.0 && change < 10.0, "percent change {change}");
    }
    Ok(())
}

#[test]
fn test_parallel_matches_sequential() -> draft_lottery::Result<()> {
    let data = derived_dataset(200);
    let sequential = test_config();
    let parallel = StudyConfig {
        parallel: true,
        num_threads: 3,
        ..test_config()
    };
    let table = table_by_id("table_e4_controls").expect("table exists");

    let a = RegressionRunner::new(&data, LinearEstimator::default(), &sequential)?
        .run_table(&table)?;
    let b = RegressionRunner::new(&data, LinearEstimator::default(), &parallel)?
        .run_table(&table)?;
    assert_eq!(a.columns.len(), b.columns.len());
    for (x, y) in a.columns.iter().zip(&b.columns) {
        assert_eq!(x.label, y.label);
        assert_eq!(x.terms, y.terms);
        assert_eq!(x.percent_change, y.percent_change);
    }
    Ok(())
}

#[test]
fn test_full_study_report() -> draft_lottery::Result<()> {
    let data = derived_dataset(300);
    let config = test_config();
    let runner = RegressionRunner::new(&data, LinearEstimator::default(), &config)?;

    let mut report = StudyReport::new(data.num_rows());
    report.compliance = Some(ComplianceRates::from_data(&data, config.reference_window)?);
    report.balance = Some(balance_table(&data, CORE_COHORTS)?);
    report.summary = Some(summary_table(&data, CORE_COHORTS, config.mean_cohort_size)?);
    for table in regression_tables() {
        let result = runner.run_table(&table)?;
        let text = result.to_string();
        assert!(text.starts_with(&table.title), "{}", table.id);
        assert!(text.contains("Observations"));
        report.tables.push(result);
    }
    assert_eq!(report.tables.len(), 7);

    let table_6 = &report.tables[3];
    assert_eq!(table_6.columns.len(), 7);
    assert!(table_6.to_string().contains("Dependent Var."));

    let balance = report.balance.as_ref().map(ToString::to_string).unwrap_or_default();
    assert!(balance.contains("Table 2"));
    let summary = report.summary.as_ref().map(ToString::to_string).unwrap_or_default();
    assert!(summary.contains("Table B.1"));

    let dir = scratch_dir("report");
    let path = dir.join("report.json");
    write_json(&path, &report)?;
    let json: serde_json::Value = serde_json::from_reader(std::fs::File::open(&path)?)?;
    assert_eq!(json["observations"], data.num_rows());
    assert_eq!(json["tables"].as_array().map(Vec::len), Some(7));
    assert_eq!(json["tables"][0]["spec"]["id"], "table_3");
    assert!(json["tables"][0]["columns"][0]["percent_change"].is_null());
    assert!(json["tables"][1]["columns"][0]["percent_change"].is_number());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
