use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use draft_lottery::algorithm::ComplianceRates;
use draft_lottery::utils::logging::log_table_skipped;
use draft_lottery::utils::{SyntheticConfig, generate_dataset};
use draft_lottery::{
    CORE_COHORTS, LinearEstimator, RegressionRunner, StudyConfig, StudyReport, VariableDeriver,
    balance_table, read_dataset_async, regression_tables, summary_table, write_json,
};
use log::{info, warn};

/// Environment variable naming the input dataset
const DATA_ENV: &str = "DRAFT_LOTTERY_DATA";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start = Instant::now();
    let config = StudyConfig::from_env();
    info!("{config}");

    let data_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(DATA_ENV).map(PathBuf::from));
    let raw = if let Some(path) = &data_path {
        read_dataset_async(path, &config)
            .await
            .with_context(|| format!("Failed to load dataset from {}", path.display()))?
    } else {
        warn!("No dataset given as argument or in {DATA_ENV}, using a synthetic lottery");
        let synthetic = SyntheticConfig::default();
        info!("{synthetic}");
        generate_dataset(&synthetic).context("Failed to generate synthetic dataset")?
    };

    let data = VariableDeriver::from_config(&config)
        .derive(&raw)
        .context("Failed to derive regression variables")?;
    let mut report = StudyReport::new(data.num_rows());

    match ComplianceRates::from_data(&data, config.reference_window) {
        Ok(rates) => {
            info!(
                "Compliance in {}: p1 = {:.4}, p2 = {:.4}",
                config.reference_window, rates.p1, rates.p2
            );
            report.compliance = Some(rates);
        }
        Err(e) => warn!("Compliance rates unavailable: {e}"),
    }

    match balance_table(&data, CORE_COHORTS) {
        Ok(table) => {
            println!("{table}");
            report.balance = Some(table);
        }
        Err(e) => log_table_skipped("Table 2", &e),
    }

    let runner = RegressionRunner::new(&data, LinearEstimator::default(), &config)?;
    for table in regression_tables() {
        match runner.run_table(&table) {
            Ok(result) => {
                println!("{result}");
                report.tables.push(result);
            }
            Err(e) => log_table_skipped(&table.title, &e),
        }
    }

    match summary_table(&data, CORE_COHORTS, config.mean_cohort_size) {
        Ok(table) => {
            println!("{table}");
            report.summary = Some(table);
        }
        Err(e) => log_table_skipped("Table B.1", &e),
    }

    if let Some(path) = &config.output_path {
        write_json(path, &report)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    info!(
        "Produced {} regression tables in {:?}",
        report.tables.len(),
        start.elapsed()
    );
    Ok(())
}
