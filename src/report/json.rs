//! JSON export of a study run

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::algorithm::{BalanceTable, ComplianceRates, SummaryTable, TableResult};
use crate::error::Result;

/// Everything a run produced, stamped with its creation time
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub generated_at: DateTime<Utc>,
    /// Rows of the derived dataset
    pub observations: usize,
    pub compliance: Option<ComplianceRates>,
    pub balance: Option<BalanceTable>,
    pub summary: Option<SummaryTable>,
    pub tables: Vec<TableResult>,
}

impl StudyReport {
    #[must_use]
    pub fn new(observations: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            observations,
            compliance: None,
            balance: None,
            summary: None,
            tables: Vec::new(),
        }
    }
}

/// Write `report` to `path` as pretty-printed JSON
///
/// # Errors
/// Returns an I/O error if the file cannot be created or a JSON error if
/// serialization fails
pub fn write_json(path: &Path, report: &StudyReport) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, report)?;
    log::info!("Wrote report with {} tables to {}", report.tables.len(), path.display());
    Ok(())
}
