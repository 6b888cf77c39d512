//! Experiment directory layout
//!
//! Discovers experiment folders under a root, classifies each one as
//! well-formed or messy, and moves misplaced raw traces into the
//! canonical `raw_results/<source>/` layout.

mod classifier;
mod normalizer;

pub use classifier::{classify, discover_experiments, find_files, walk_files};
pub use normalizer::{normalize_all, normalize_directory, NormalizeOutcome, STAGE as NORMALIZE_STAGE};

use crate::models::TraceSource;
use std::path::{Path, PathBuf};

/// Benchmark log name prefix inside `raw_results/limbo/`
const BENCHMARK_PREFIX: &str = "limbo_results_teastore_";

/// Locate the load-benchmark log for an intensity level
///
/// Prefers `limbo_results_teastore_<intensity>.csv` (`med` is spelled
/// `medium` on disk). Falls back to the lexicographically first
/// `limbo_results_teastore_*.csv` so repeated lookups agree.
pub fn resolve_benchmark_log(experiment: &Path, intensity: &str) -> Option<PathBuf> {
    let limbo_dir = TraceSource::Limbo.raw_dir(experiment);
    let file_intensity = match intensity {
        "med" => "medium",
        other => other,
    };

    let exact = limbo_dir.join(format!("{BENCHMARK_PREFIX}{file_intensity}.csv"));
    if exact.is_file() {
        return Some(exact);
    }

    find_files(&limbo_dir, |name| {
        name.starts_with(BENCHMARK_PREFIX) && name.ends_with(".csv")
    })
    .ok()?
    .into_iter()
    .next()
}
