//! Clean command orchestrator

use crate::config::AppConfig;
use crate::output;
use schbuild_core::{CLEAN_EXTENSIONS, CleanReport, clean};
use std::path::Path;

/// Remove generated outputs from `directory` and print what went
///
/// Never fails; files that cannot be removed and reports that cannot be
/// formatted are only logged.
pub fn execute(directory: &Path, config: &AppConfig, use_color: bool) -> CleanReport {
    let report = clean(directory, CLEAN_EXTENSIONS, config.build.recursive);
    log::debug!(
        "Removed {} file(s) from {}",
        report.removed.len(),
        directory.display()
    );

    let formatter = output::create_formatter(config.output.format, use_color, None);
    match formatter.format_clean(&report) {
        Ok(text) => print!("{text}"),
        Err(e) => log::warn!("Could not format clean report: {e}"),
    }

    report
}
