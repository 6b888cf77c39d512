//! Moves misplaced raw traces into `raw_results/<source>/`

use super::classifier::{classify, discover_experiments};
use crate::error::{PipelineError, Result};
use crate::models::{ExperimentDirectory, ItemFailure, StageReport, TraceSource};
use crate::observability::log_item_failure;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const STAGE: &str = "normalize";

/// What happened to one experiment directory
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    /// (from, to) pairs of files moved
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Per-file move failures; remaining files were still attempted
    pub failures: Vec<ItemFailure>,
}

impl NormalizeOutcome {
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty() && self.failures.is_empty()
    }
}

/// Normalize a classified directory
///
/// Well-formed directories are left alone. For messy ones the three
/// canonical subdirectories are created and each loose trace is renamed
/// into the one matching its prefix. Failing to create the layout is a
/// directory-level error; a failed move is recorded and skipped.
pub fn normalize_directory(experiment: &ExperimentDirectory) -> Result<NormalizeOutcome> {
    let mut outcome = NormalizeOutcome::default();
    if !experiment.is_messy() {
        return Ok(outcome);
    }

    for source in TraceSource::ALL {
        let dir = source.raw_dir(&experiment.path);
        fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;
    }
    info!(experiment = %experiment.name(), "Created canonical raw_results layout");

    for file in &experiment.loose_traces {
        let Some(name) = file.file_name() else { continue };
        let Some(source) = TraceSource::for_file_name(&name.to_string_lossy()) else {
            continue;
        };

        let destination = source.raw_dir(&experiment.path).join(name);
        match fs::rename(file, &destination) {
            Ok(()) => {
                debug!(
                    from = %file.display(),
                    to = %destination.display(),
                    "Moved raw trace"
                );
                outcome.moved.push((file.clone(), destination));
            }
            Err(e) => {
                let failure = ItemFailure::new(file, format!("move to {} failed: {}", source, e));
                log_item_failure(STAGE, &failure);
                outcome.failures.push(failure);
            }
        }
    }

    Ok(outcome)
}

/// Classify and normalize every experiment folder under `root`
///
/// A missing root is returned as an error; everything else is recorded
/// in the report.
pub fn normalize_all(root: &Path, prefix: &str) -> Result<StageReport> {
    let folders = discover_experiments(root, prefix)?;
    let mut report = StageReport::new(STAGE);
    report.found = folders.len();

    for folder in folders {
        let result = classify(&folder).and_then(|exp| normalize_directory(&exp));
        match result {
            Ok(outcome) if outcome.is_noop() => report.unchanged += 1,
            Ok(outcome) => {
                report.modified += 1;
                report.changes += outcome.moved.len();
                info!(
                    experiment = %folder.display(),
                    moved = outcome.moved.len(),
                    failed = outcome.failures.len(),
                    "Normalized messy experiment folder"
                );
                report.failures.extend(outcome.failures);
            }
            Err(e) => {
                let failure = ItemFailure::new(&folder, e);
                log_item_failure(STAGE, &failure);
                report.record_failure(failure);
            }
        }
    }

    Ok(report)
}
