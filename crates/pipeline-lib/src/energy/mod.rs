//! Energy trace resampling
//!
//! Raw per-sample traces under `raw_results/ecofloc/` are reduced to one
//! row per whole second in `clean_results/ecofloc/`.

mod parser;
mod resample;

pub use parser::{parse_line, parse_timestamp, parse_trace, EnergySample, ParsedTrace, SUMMARY_PREFIXES};
pub use resample::{
    clean_path_for, format_energy, is_raw_energy_trace, render, resample, resample_file, ResampleOptions,
    ResampleOutcome, SecondBucket, SECOND_FORMAT,
};

use crate::error::Result;
use crate::layout::walk_files;
use crate::models::{ItemFailure, StageReport};
use crate::observability::log_item_failure;
use std::path::{Path, PathBuf};

pub const STAGE: &str = "resample";

/// Every raw energy trace under `root`
pub fn find_raw_traces(root: &Path) -> Result<Vec<PathBuf>> {
    walk_files(root, is_raw_energy_trace)
}

/// Resample every raw energy trace under `root`
///
/// Files without samples, or that cannot be read or written, are
/// recorded as failures; the traversal always completes.
pub fn resample_all(root: &Path, options: &ResampleOptions) -> Result<StageReport> {
    let traces = find_raw_traces(root)?;
    let mut report = StageReport::new(STAGE);
    report.found = traces.len();

    for raw in traces {
        match resample_file(&raw, options) {
            Ok(outcome) => {
                report.modified += 1;
                report.changes += outcome.rows_written;
            }
            Err(e) => {
                let failure = ItemFailure::new(&raw, e);
                log_item_failure(STAGE, &failure);
                report.record_failure(failure);
            }
        }
    }

    Ok(report)
}
