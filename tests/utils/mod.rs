//! Shared fixtures for integration tests

use std::path::PathBuf;

use draft_lottery::utils::{SyntheticConfig, generate_dataset};
use draft_lottery::{RecordBatch, StudyConfig, VariableDeriver};

/// Synthetic lottery with `rows_per_cohort` rows for every cohort
pub fn synthetic(rows_per_cohort: usize) -> SyntheticConfig {
    SyntheticConfig {
        rows_per_cohort,
        ..SyntheticConfig::default()
    }
}

/// Raw synthetic dataset in the input encoding
pub fn raw_dataset(rows_per_cohort: usize) -> RecordBatch {
    generate_dataset(&synthetic(rows_per_cohort)).expect("synthetic dataset")
}

/// Synthetic dataset with derived columns
pub fn derived_dataset(rows_per_cohort: usize) -> RecordBatch {
    VariableDeriver::from_config(&test_config())
        .derive(&raw_dataset(rows_per_cohort))
        .expect("derived dataset")
}

/// Sequential configuration without progress bars
pub fn test_config() -> StudyConfig {
    StudyConfig {
        parallel: false,
        show_progress: false,
        ..StudyConfig::default()
    }
}

/// Fresh scratch directory under the system temp dir
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("draft_lottery_{}_{name}", std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("clean scratch dir");
    }
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
