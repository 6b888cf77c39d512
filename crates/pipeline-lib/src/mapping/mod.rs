//! Process-mapping file cleanup
//!
//! Two passes over every `informe_pids.csv` under a root: repeated header
//! removal, then node-name standardization. Standardization depends on
//! column positions, so it must run after headers are cleaned.

mod headers;
mod names;


pub use headers::{
    backup_path, strip_repeated_headers, HeaderClassifier, HeaderCleanOutcome, HeaderCleaner,
    HeaderScan, LineKind, RemovalKind, RemovedLine, HEADER_KEYWORDS, HEADER_THRESHOLD,
};
pub use names::{
    canonical_node, standardize_file, standardize_node, StandardizeOutcome, MAPPING_HEADER,
    NODE_RULES,
};

use crate::error::Result;
use crate::layout::walk_files;
use crate::models::{ItemFailure, StageReport};
use crate::observability::log_item_failure;
use std::path::{Path, PathBuf};

pub const DEDUP_STAGE: &str = "dedup-headers";
pub const STANDARDIZE_STAGE: &str = "standardize";

/// Every mapping file named `file_name` anywhere under `root`
pub fn find_mapping_files(root: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    walk_files(root, |p| p.ends_with(file_name))
}

/// Counters plus per-file detail from a header cleanup pass
#[derive(Debug, Default)]
pub struct HeaderCleanRun {
    pub report: StageReport,
    pub files: Vec<(PathBuf, HeaderCleanOutcome)>,
}

/// Remove repeated headers from every mapping file under `root`
pub fn dedup_headers_all(root: &Path, file_name: &str, cleaner: &HeaderCleaner) -> Result<HeaderCleanRun> {
    let files = find_mapping_files(root, file_name)?;
    let mut run = HeaderCleanRun {
        report: StageReport::new(DEDUP_STAGE),
        files: Vec::with_capacity(files.len()),
    };
    run.report.found = files.len();

    for file in files {
        match cleaner.clean_file(&file) {
            Ok(outcome) => {
                if outcome.modified() {
                    run.report.modified += 1;
                    run.report.changes += outcome.scan.headers_removed();
                } else {
                    run.report.unchanged += 1;
                }
                run.files.push((file, outcome));
            }
            Err(e) => {
                let failure = ItemFailure::new(&file, e);
                log_item_failure(DEDUP_STAGE, &failure);
                run.report.record_failure(failure);
            }
        }
    }

    Ok(run)
}

/// Standardize node names in every mapping file under `root`
///
/// Malformed files are recorded as failures and left untouched.
pub fn standardize_all(root: &Path, file_name: &str, classifier: &HeaderClassifier) -> Result<StageReport> {
    let files = find_mapping_files(root, file_name)?;
    let mut report = StageReport::new(STANDARDIZE_STAGE);
    report.found = files.len();

    for file in files {
        match standardize_file(&file, classifier) {
            Ok(outcome) => {
                if outcome.rewritten {
                    report.modified += 1;
                } else {
                    report.unchanged += 1;
                }
                report.changes += outcome.changed;
            }
            Err(e) => {
                let failure = ItemFailure::new(&file, e);
                log_item_failure(STANDARDIZE_STAGE, &failure);
                report.record_failure(failure);
            }
        }
    }

    Ok(report)
}
