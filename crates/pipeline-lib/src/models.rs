//! Core data models for the cleaning pipeline

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Top-level directory holding the canonical raw layout
pub const RAW_RESULTS_DIR: &str = "raw_results";

/// Top-level directory holding resampled traces
pub const CLEAN_RESULTS_DIR: &str = "clean_results";

/// Tool that produced a raw trace file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceSource {
    /// Per-process / per-component energy samples
    Ecofloc,
    /// Load-benchmark transaction logs
    Limbo,
    /// Per-node power samples
    Scaph,
}

impl TraceSource {
    pub const ALL: [TraceSource; 3] = [Self::Ecofloc, Self::Limbo, Self::Scaph];

    /// Subdirectory name under `raw_results/`
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Ecofloc => "ecofloc",
            Self::Limbo => "limbo",
            Self::Scaph => "scaph",
        }
    }

    /// Whether a bare file name belongs to this source
    pub fn matches(self, file_name: &str) -> bool {
        match self {
            Self::Ecofloc => file_name.starts_with("ecofloc_") && file_name.ends_with(".txt"),
            Self::Limbo => {
                file_name.starts_with("limbo_")
                    && (file_name.ends_with(".txt") || file_name.ends_with(".csv"))
            }
            Self::Scaph => file_name.starts_with("scaph_") && file_name.ends_with(".txt"),
        }
    }

    /// Classify a file name into its source, if any
    pub fn for_file_name(file_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|source| source.matches(file_name))
    }

    /// `<experiment>/raw_results/<source>`
    pub fn raw_dir(self, experiment: &Path) -> PathBuf {
        experiment.join(RAW_RESULTS_DIR).join(self.dir_name())
    }

    /// `<experiment>/clean_results/<source>`
    pub fn clean_dir(self, experiment: &Path) -> PathBuf {
        experiment.join(CLEAN_RESULTS_DIR).join(self.dir_name())
    }
}

impl fmt::Display for TraceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Layout state of an experiment directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutState {
    WellFormed,
    /// No `raw_results/` but raw energy traces sit directly inside
    Messy,
}

impl fmt::Display for LayoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WellFormed => f.write_str("well-formed"),
            Self::Messy => f.write_str("messy"),
        }
    }
}

/// One test run on disk
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentDirectory {
    pub path: PathBuf,
    pub state: LayoutState,
    /// Raw trace files found directly inside `path` (empty once normalized)
    pub loose_traces: Vec<PathBuf>,
}

impl ExperimentDirectory {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_messy(&self) -> bool {
        self.state == LayoutState::Messy
    }
}

/// Parsed `ecofloc_<node>_<component>.txt` file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceFileName {
    pub node: String,
    pub component: String,
}

impl TraceFileName {
    pub fn parse(file_name: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^ecofloc_([^_]+)_(.+)\.txt$").expect("static trace name pattern")
        });

        let caps = pattern.captures(file_name)?;
        Some(Self {
            node: caps[1].to_string(),
            component: caps[2].to_string(),
        })
    }
}

/// A single recovered failure inside a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub message: String,
}

impl ItemFailure {
    pub fn new(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Counters accumulated by one stage over a traversal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    /// Items the stage looked at
    pub found: usize,
    /// Items the stage changed on disk
    pub modified: usize,
    /// Items inspected and left as they were
    pub unchanged: usize,
    /// Stage-specific change count: files moved, header lines removed,
    /// node values rewritten, resampled rows written
    pub changes: usize,
    pub failures: Vec<ItemFailure>,
}

impl StageReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Default::default()
        }
    }

    pub fn errored(&self) -> usize {
        self.failures.len()
    }

    pub fn record_failure(&mut self, failure: ItemFailure) {
        self.failures.push(failure);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
