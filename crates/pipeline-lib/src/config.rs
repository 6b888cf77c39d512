//! Pipeline configuration

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `EXPCLEAN_MAKE_BACKUP=false`
pub const ENV_PREFIX: &str = "EXPCLEAN";

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Root directory holding experiment folders
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Write a `.bak` copy before rewriting a mapping file
    #[serde(default = "default_make_backup")]
    pub make_backup: bool,

    /// Error log file name, created at the root
    #[serde(default = "default_error_log_name")]
    pub error_log_name: String,

    /// Name prefix identifying experiment folders
    #[serde(default = "default_experiment_prefix")]
    pub experiment_prefix: String,

    /// Per-process mapping file name
    #[serde(default = "default_mapping_file_name")]
    pub mapping_file_name: String,

    /// Provenance lines copied verbatim at the top of each energy trace
    #[serde(default = "default_energy_header_lines")]
    pub energy_header_lines: usize,

    /// Zero-based column holding the energy value in a trace row
    #[serde(default = "default_energy_column")]
    pub energy_column: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_make_backup() -> bool {
    true
}

fn default_error_log_name() -> String {
    "errors.log".to_string()
}

fn default_experiment_prefix() -> String {
    "ejecucion(".to_string()
}

fn default_mapping_file_name() -> String {
    "informe_pids.csv".to_string()
}

fn default_energy_header_lines() -> usize {
    2
}

fn default_energy_column() -> usize {
    2
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            make_backup: default_make_backup(),
            error_log_name: default_error_log_name(),
            experiment_prefix: default_experiment_prefix(),
            mapping_file_name: default_mapping_file_name(),
            energy_header_lines: default_energy_header_lines(),
            energy_column: default_energy_column(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from an optional TOML file, then the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Config rooted at `root` with everything else defaulted
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Full path of the persistent error log
    pub fn error_log_path(&self) -> PathBuf {
        self.root.join(&self.error_log_name)
    }
}
