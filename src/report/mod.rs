//! Output of study results: fixed-width text tables and a JSON report

pub mod json;
pub mod text;

pub use json::{StudyReport, write_json};
pub use text::significance;
