//! Utility modules shared by the pipeline
//!
//! Arrow column helpers, logging and progress helpers, and the synthetic
//! dataset generator used by the demo binary and the tests.

pub mod arrow;
pub mod logging;
pub mod synthetic;

pub use synthetic::{SyntheticConfig, generate_dataset, generate_observations};
