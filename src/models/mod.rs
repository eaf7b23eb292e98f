//! Data model of the lottery dataset
//!
//! Column names, cohort windows and typed observation records.

pub mod cohort;
pub mod columns;
pub mod observation;
pub mod stat;

pub use cohort::{CORE_COHORTS, CohortRange, FULL_SPAN};
pub use observation::{Observation, Origin, observations_to_batch};
pub use stat::Stat;
