//! One-second resampling of raw energy traces

use super::parser::{parse_trace, EnergySample};
use crate::error::{PipelineError, Result};
use crate::models::{TraceFileName, TraceSource, RAW_RESULTS_DIR};
use chrono::{NaiveDateTime, Timelike};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output timestamp layout, whole seconds only
pub const SECOND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parsing knobs for raw traces
#[derive(Debug, Clone, Copy)]
pub struct ResampleOptions {
    /// Provenance lines copied verbatim to the output
    pub header_lines: usize,
    /// Zero-based energy column
    pub energy_column: usize,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            header_lines: 2,
            energy_column: 2,
        }
    }
}

/// Summed energy for one whole second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondBucket {
    pub second: NaiveDateTime,
    pub energy: f64,
}

impl SecondBucket {
    /// `YYYY-MM-DD HH:MM:SS,<energy>`
    pub fn to_line(&self) -> String {
        format!("{},{}", self.second.format(SECOND_FORMAT), format_energy(self.energy))
    }
}

/// Plain decimal rendering that always keeps a fractional part: `7.0`, `0.0000001`
pub fn format_energy(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Floor every sample to its second and sum energy per second, ascending
pub fn resample(samples: &[EnergySample]) -> Vec<SecondBucket> {
    let mut buckets: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for sample in samples {
        let second = sample
            .timestamp
            .with_nanosecond(0)
            .unwrap_or(sample.timestamp);
        *buckets.entry(second).or_insert(0.0) += sample.energy;
    }

    buckets
        .into_iter()
        .map(|(second, energy)| SecondBucket { second, energy })
        .collect()
}

/// Render the cleaned file: provenance lines, then one row per second
pub fn render(headers: &[String], buckets: &[SecondBucket]) -> String {
    let mut out = String::new();
    for header in headers {
        let _ = writeln!(out, "{}", header);
    }
    for bucket in buckets {
        let _ = writeln!(out, "{}", bucket.to_line());
    }
    out
}

/// Destination for a raw trace: `<exp>/raw_results/ecofloc/x` -> `<exp>/clean_results/ecofloc/x`
pub fn clean_path_for(raw: &Path) -> Result<PathBuf> {
    let not_trace = || PipelineError::NotAnExperimentTrace(raw.to_path_buf());

    let file_name = raw.file_name().ok_or_else(not_trace)?;
    let source_dir = raw.parent().ok_or_else(not_trace)?;
    let raw_dir = source_dir.parent().ok_or_else(not_trace)?;
    let experiment = raw_dir.parent().ok_or_else(not_trace)?;

    let source = TraceSource::Ecofloc;
    if !source_dir.ends_with(source.dir_name()) || !raw_dir.ends_with(RAW_RESULTS_DIR) {
        return Err(not_trace());
    }

    Ok(source.clean_dir(experiment).join(file_name))
}

/// Whether `path` is `.../raw_results/ecofloc/ecofloc_<node>_<component>.txt`
pub fn is_raw_energy_trace(path: &Path) -> bool {
    let is_trace_name = path
        .file_name()
        .and_then(|n| TraceFileName::parse(&n.to_string_lossy()))
        .is_some();
    is_trace_name && clean_path_for(path).is_ok()
}

/// Outcome of resampling one trace
#[derive(Debug, Clone)]
pub struct ResampleOutcome {
    pub output: PathBuf,
    pub raw_rows: usize,
    pub rows_written: usize,
    pub dropped_lines: usize,
    pub total_energy: f64,
}

/// Resample one raw trace into the mirrored clean-results tree
///
/// The raw file is never modified. A trace with no parseable samples
/// yields `NoEnergyRows` and no output file.
pub fn resample_file(raw: &Path, options: &ResampleOptions) -> Result<ResampleOutcome> {
    let output = clean_path_for(raw)?;
    let content = fs::read_to_string(raw).map_err(|e| PipelineError::io(raw, e))?;

    let trace = parse_trace(&content, options.header_lines, options.energy_column);
    if trace.samples.is_empty() {
        return Err(PipelineError::NoEnergyRows(raw.to_path_buf()));
    }

    let buckets = resample(&trace.samples);
    if let Some(dir) = output.parent() {
        fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
    }
    fs::write(&output, render(&trace.headers, &buckets))
        .map_err(|e| PipelineError::io(&output, e))?;

    let name = raw.file_name().unwrap_or_default().to_string_lossy();
    if let Some(parsed) = TraceFileName::parse(&name) {
        debug!(node = %parsed.node, component = %parsed.component, "Resampled trace identity");
    }
    info!(
        raw = %raw.display(),
        output = %output.display(),
        raw_rows = trace.samples.len(),
        rows = buckets.len(),
        dropped = trace.dropped,
        "Resampled energy trace to one-second buckets"
    );

    Ok(ResampleOutcome {
        output,
        raw_rows: trace.samples.len(),
        rows_written: buckets.len(),
        dropped_lines: trace.dropped,
        total_energy: trace.total_energy(),
    })
}
