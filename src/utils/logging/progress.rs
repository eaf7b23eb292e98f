//! Progress reporting for table fits
//!
//! Each table column is one regression fit; the bar advances once per fit.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for the column progress bar
pub const DEFAULT_COLUMN_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Create a progress bar over the columns of a table
///
/// A hidden bar is returned when progress reporting is disabled, so callers
/// can tick it unconditionally.
#[must_use]
pub fn create_column_progress_bar(length: u64, description: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(length);
    match ProgressStyle::default_bar().template(DEFAULT_COLUMN_TEMPLATE) {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => log::warn!("Invalid progress template, using default style: {e}"),
    }
    pb.set_message(description.to_string());
    pb
}

/// Finish a progress bar with a completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}
