//! Observability for pipeline runs
//!
//! Provides:
//! - Structured stage events through `tracing`
//! - The persistent per-run error log written at the invocation root

use crate::error::{PipelineError, Result};
use crate::models::{ItemFailure, StageReport};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Timestamp layout used for error log lines
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only error log, truncated when a run starts
///
/// Only failures are persisted; progress goes to the tracing subscriber.
pub struct ErrorLog {
    path: PathBuf,
    writer: BufWriter<File>,
    entries: usize,
}

impl ErrorLog {
    /// Create (or truncate) the log file at `path`
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| PipelineError::io(&path, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            entries: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines written during this run
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Persist one line at ERROR level
    pub fn record(&mut self, message: &str) -> Result<()> {
        let now = chrono::Local::now().format(LOG_TIME_FORMAT);
        writeln!(self.writer, "{} - ERROR - {}", now, message)
            .and_then(|_| self.writer.flush())
            .map_err(|e| PipelineError::io(&self.path, e))?;
        self.entries += 1;
        Ok(())
    }

    /// Persist every failure a stage recovered from
    pub fn record_stage(&mut self, report: &StageReport) -> Result<()> {
        for failure in &report.failures {
            self.record(&format!("[{}] {}", report.stage, failure))?;
        }
        Ok(())
    }
}

/// Log that a stage is starting
pub fn log_stage_start(stage: &str, root: &Path) {
    info!(
        event = "stage_started",
        stage = %stage,
        root = %root.display(),
        "Starting stage"
    );
}

/// Log a recovered failure at the moment it happens
pub fn log_item_failure(stage: &str, failure: &ItemFailure) {
    warn!(
        event = "item_failed",
        stage = %stage,
        path = %failure.path.display(),
        error = %failure.message,
        "Item failed, continuing"
    );
}

/// Log the counters a stage accumulated
pub fn log_stage_summary(report: &StageReport) {
    if report.is_clean() {
        info!(
            event = "stage_completed",
            stage = %report.stage,
            found = report.found,
            modified = report.modified,
            unchanged = report.unchanged,
            changes = report.changes,
            "Stage complete"
        );
    } else {
        error!(
            event = "stage_completed",
            stage = %report.stage,
            found = report.found,
            modified = report.modified,
            unchanged = report.unchanged,
            changes = report.changes,
            errored = report.errored(),
            "Stage complete with errors"
        );
    }
}
