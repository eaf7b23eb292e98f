//! Estimation pipeline
//!
//! Raw observations flow forward through three stages: the
//! [`VariableDeriver`] appends derived columns, the [`SampleBuilder`] turns a
//! [`ColumnSpec`] into a filtered sample and design, and the
//! [`RegressionRunner`] fits each column and collects its statistics.
//! Balance tests and descriptive statistics work on the derived data
//! directly.

pub mod balance;
pub mod derive;
pub mod runner;
pub mod sample;
pub mod specification;
pub mod summary;

pub use balance::{BalanceTable, balance_table};
pub use derive::VariableDeriver;
pub use runner::{
    ColumnStatistics, ComplianceRates, RegressionRunner, TableResult, TermStatistic,
    baseline_mean, percent_change, wald_estimate,
};
pub use sample::{Sample, SampleBuilder, sample_filter};
pub use specification::{
    ColumnSpec, Controls, EffectScaling, Method, RegressorSet, TableSpec, TermRow,
};
pub use summary::{SummaryTable, summary_table};
