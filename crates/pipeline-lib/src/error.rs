//! Error taxonomy for the cleaning pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised while normalizing or cleaning experiment data
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The invocation root is missing; nothing can run
    #[error("root directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping file does not have the fixed column count
    #[error("expected {expected} columns but found {found} in {}", path.display())]
    MalformedMapping {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// Energy trace contained no parseable sample after the provenance lines
    #[error("no parseable energy rows in {}", .0.display())]
    NoEnergyRows(PathBuf),

    /// Energy trace is not located under `raw_results/ecofloc/`
    #[error("not an experiment energy trace: {}", .0.display())]
    NotAnExperimentTrace(PathBuf),

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl PipelineError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts a whole run instead of a single item
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RootNotFound(_) | Self::Config(_))
    }
}
