//! Configuration for the replication pipeline.

use std::fmt;
use std::path::PathBuf;

use crate::models::{CORE_COHORTS, CohortRange, FULL_SPAN};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Mean size of the 1958-1962 cohorts, used to scale shares to head counts
pub const DEFAULT_MEAN_COHORT_SIZE: f64 = 236_656.0;

/// Environment variable overriding the Parquet batch size
pub const BATCH_SIZE_ENV: &str = "DRAFT_LOTTERY_BATCH_SIZE";

/// Environment variable naming the JSON report destination
pub const OUTPUT_ENV: &str = "DRAFT_LOTTERY_OUTPUT";

/// How cohort dummies are coded for rows whose cohort is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCohortPolicy {
    /// Every dummy is missing for the row, so complete-case filtering drops it
    #[default]
    Propagate,
    /// Every dummy is 0 for the row, reproducing the legacy tables
    LegacyZero,
}

impl fmt::Display for MissingCohortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Propagate => write!(f, "propagate"),
            Self::LegacyZero => write!(f, "legacy-zero"),
        }
    }
}

/// Configuration for a replication run
#[derive(Debug, Clone)]
pub struct StudyConfig {
    /// Cohorts for which dummies are generated; the first is the baseline
    pub cohort_span: CohortRange,
    /// Window in which compliance rates are measured for Wald scaling
    pub reference_window: CohortRange,
    /// Coding of cohort dummies when the cohort is missing
    pub missing_cohort_policy: MissingCohortPolicy,
    /// Mean cohort size for the head-count column of the summary table
    pub mean_cohort_size: f64,
    /// Fit the columns of a table in parallel
    pub parallel: bool,
    /// Worker threads used for parallel fits
    pub num_threads: usize,
    /// Show a progress bar while a table is fitted
    pub show_progress: bool,
    /// Batch size for reading Parquet files
    pub batch_size: usize,
    /// Where to write the JSON report, if anywhere
    pub output_path: Option<PathBuf>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            cohort_span: FULL_SPAN,
            reference_window: CORE_COHORTS,
            missing_cohort_policy: MissingCohortPolicy::default(),
            mean_cohort_size: DEFAULT_MEAN_COHORT_SIZE,
            parallel: true,
            num_threads: num_cpus::get(),
            show_progress: true,
            batch_size: DEFAULT_BATCH_SIZE,
            output_path: None,
        }
    }
}

impl StudyConfig {
    /// Default configuration with overrides taken from the environment
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(batch_size) = get_batch_size() {
            config.batch_size = batch_size;
        }
        if let Ok(path) = std::env::var(OUTPUT_ENV) {
            config.output_path = Some(PathBuf::from(path));
        }
        config
    }

    /// Cohort whose dummy must never enter a regression
    #[must_use]
    pub fn baseline_cohort(&self) -> i32 {
        self.cohort_span.first
    }
}

/// Batch size from the environment, if set to a valid number
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var(BATCH_SIZE_ENV)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|size| *size > 0)
}

impl fmt::Display for StudyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Study Configuration:")?;
        writeln!(f, "  Cohort Span: {}", self.cohort_span)?;
        writeln!(f, "  Baseline Cohort: {}", self.baseline_cohort())?;
        writeln!(f, "  Compliance Window: {}", self.reference_window)?;
        writeln!(f, "  Missing Cohort Dummies: {}", self.missing_cohort_policy)?;
        writeln!(f, "  Parallel Fits: {} ({} threads)", self.parallel, self.num_threads)?;
        writeln!(f, "  Batch Size: {}", self.batch_size)?;
        if let Some(path) = &self.output_path {
            writeln!(f, "  JSON Report: {}", path.display())?;
        }
        Ok(())
    }
}
