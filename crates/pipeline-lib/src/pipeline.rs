//! Pipeline driver
//!
//! Runs the stages in a fixed order across a root directory:
//! normalize -> dedup-headers -> standardize -> resample.
//! Normalization must finish before later stages can find files at
//! their canonical paths, and header cleanup must finish before the
//! column-position-dependent standardization.

use crate::config::PipelineConfig;
use crate::energy::{self, ResampleOptions};
use crate::error::{PipelineError, Result};
use crate::layout::{self, classify, discover_experiments, resolve_benchmark_log};
use crate::mapping::{self, HeaderClassifier, HeaderCleanRun, HeaderCleaner};
use crate::models::{LayoutState, StageReport, TraceSource};
use crate::observability::{log_stage_start, log_stage_summary, ErrorLog};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// A single pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    DedupHeaders,
    Standardize,
    Resample,
}

impl Stage {
    /// Execution order of a full run
    pub const ORDER: [Stage; 4] = [
        Self::Normalize,
        Self::DedupHeaders,
        Self::Standardize,
        Self::Resample,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Normalize => layout::NORMALIZE_STAGE,
            Self::DedupHeaders => mapping::DEDUP_STAGE,
            Self::Standardize => mapping::STANDARDIZE_STAGE,
            Self::Resample => energy::STAGE,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reports of every stage that ran, in order
#[derive(Debug, Default, Serialize)]
pub struct PipelineSummary {
    pub stages: Vec<StageReport>,
}

impl PipelineSummary {
    pub fn total_errors(&self) -> usize {
        self.stages.iter().map(StageReport::errored).sum()
    }

    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

/// One experiment folder as seen by `scan`
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentSummary {
    pub name: String,
    pub path: PathBuf,
    pub state: LayoutState,
    pub raw_energy_traces: usize,
    pub clean_energy_traces: usize,
    pub has_mapping: bool,
    pub benchmark_log: Option<PathBuf>,
}

/// Synchronous single-pass driver
///
/// Not safe to run concurrently against the same root.
pub struct Pipeline {
    config: PipelineConfig,
    cleaner: HeaderCleaner,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let cleaner = HeaderCleaner::new(HeaderClassifier::default(), config.make_backup);
        Self { config, cleaner }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn resample_options(&self) -> ResampleOptions {
        ResampleOptions {
            header_lines: self.config.energy_header_lines,
            energy_column: self.config.energy_column,
        }
    }

    fn ensure_root(&self) -> Result<()> {
        if self.config.root.is_dir() {
            Ok(())
        } else {
            Err(PipelineError::RootNotFound(self.config.root.clone()))
        }
    }

    /// Run every stage in order
    pub fn run(&self, error_log: &mut ErrorLog) -> Result<PipelineSummary> {
        self.run_stages(&Stage::ORDER, error_log)
    }

    /// Run the given stages in the given order
    ///
    /// A missing root aborts before any stage runs. Item failures are
    /// recorded in the summary and the error log and never stop the run.
    pub fn run_stages(&self, stages: &[Stage], error_log: &mut ErrorLog) -> Result<PipelineSummary> {
        self.ensure_root()?;

        let mut summary = PipelineSummary::default();
        for &stage in stages {
            log_stage_start(stage.name(), &self.config.root);
            let report = self.run_stage(stage)?;
            log_stage_summary(&report);

            if let Err(e) = error_log.record_stage(&report) {
                warn!(error = %e, "Could not persist stage failures");
            }
            summary.stages.push(report);
        }

        info!(
            stages = summary.stages.len(),
            errors = summary.total_errors(),
            "Pipeline finished"
        );
        Ok(summary)
    }

    /// Run one stage, returning its report
    pub fn run_stage(&self, stage: Stage) -> Result<StageReport> {
        let root = &self.config.root;
        match stage {
            Stage::Normalize => layout::normalize_all(root, &self.config.experiment_prefix),
            Stage::DedupHeaders => self.dedup_headers().map(|run| run.report),
            Stage::Standardize => mapping::standardize_all(
                root,
                &self.config.mapping_file_name,
                self.cleaner.classifier(),
            ),
            Stage::Resample => energy::resample_all(root, &self.resample_options()),
        }
    }

    /// Header cleanup with per-file detail
    pub fn dedup_headers(&self) -> Result<HeaderCleanRun> {
        mapping::dedup_headers_all(&self.config.root, &self.config.mapping_file_name, &self.cleaner)
    }

    /// Describe every experiment folder without changing anything
    pub fn scan(&self) -> Result<Vec<ExperimentSummary>> {
        let folders = discover_experiments(&self.config.root, &self.config.experiment_prefix)?;

        let mut summaries = Vec::with_capacity(folders.len());
        for folder in folders {
            let experiment = match classify(&folder) {
                Ok(experiment) => experiment,
                Err(e) => {
                    warn!(path = %folder.display(), error = %e, "Could not classify folder");
                    continue;
                }
            };

            let count_traces = |dir: PathBuf| {
                layout::find_files(&dir, |name| TraceSource::Ecofloc.matches(name))
                    .map(|files| files.len())
                    .unwrap_or(0)
            };

            summaries.push(ExperimentSummary {
                name: experiment.name(),
                raw_energy_traces: count_traces(TraceSource::Ecofloc.raw_dir(&folder)),
                clean_energy_traces: count_traces(TraceSource::Ecofloc.clean_dir(&folder)),
                has_mapping: folder.join(&self.config.mapping_file_name).is_file(),
                benchmark_log: resolve_benchmark_log(&folder, "med"),
                state: experiment.state,
                path: folder,
            });
        }

        Ok(summaries)
    }
}
