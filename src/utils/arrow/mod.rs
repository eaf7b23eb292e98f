//! Arrow data handling utilities
//!
//! Typed column extraction and column replacement for record batches.

pub mod array_utils;

// Re-export commonly used functions for convenience
pub use array_utils::{
    dense_values, float_array, get_column, int_array, is_numeric, mean_non_null, with_columns,
};
