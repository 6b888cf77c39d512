//! Experiment discovery and layout classification

use crate::error::{PipelineError, Result};
use crate::models::{ExperimentDirectory, LayoutState, TraceSource, RAW_RESULTS_DIR};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Recursively find every directory under `root` whose name starts with `prefix`
///
/// Results are sorted so traversal order is stable between runs.
pub fn discover_experiments(root: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PipelineError::RootNotFound(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable path during discovery");
                continue;
            }
        };

        if entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with(prefix) {
            folders.push(entry.into_path());
        }
    }

    folders.sort();
    info!(root = %root.display(), count = folders.len(), "Discovered experiment folders");
    Ok(folders)
}

/// Recursively collect regular files under `root` accepted by `filter`, sorted
pub fn walk_files(root: &Path, filter: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PipelineError::RootNotFound(root.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable path during scan");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && filter(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

/// Inspect a single experiment directory
///
/// Messy means no `raw_results/` AND at least one raw energy trace
/// sitting directly inside the folder.
pub fn classify(path: &Path) -> Result<ExperimentDirectory> {
    let loose_traces = find_files(path, |name| TraceSource::for_file_name(name).is_some())?;

    let has_raw_results = path.join(RAW_RESULTS_DIR).is_dir();
    let has_loose_energy = loose_traces.iter().any(|p| {
        p.file_name()
            .map(|n| TraceSource::Ecofloc.matches(&n.to_string_lossy()))
            .unwrap_or(false)
    });

    let state = if !has_raw_results && has_loose_energy {
        LayoutState::Messy
    } else {
        LayoutState::WellFormed
    };

    debug!(
        path = %path.display(),
        state = %state,
        loose = loose_traces.len(),
        "Classified experiment folder"
    );

    Ok(ExperimentDirectory {
        path: path.to_path_buf(),
        state,
        loose_traces,
    })
}

/// Regular files directly inside `dir` whose name satisfies `filter`, sorted
pub fn find_files(dir: &Path, filter: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if filter(&entry.file_name().to_string_lossy()) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_is_recursive_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("ejecucion(2)")).unwrap();
        fs::create_dir_all(root.join("batch_a").join("ejecucion(1)")).unwrap();
        fs::create_dir_all(root.join("notes")).unwrap();
        fs::write(root.join("ejecucion(3).txt"), "not a folder").unwrap();

        let found = discover_experiments(root, "ejecucion(").unwrap();
        assert_eq!(
            found,
            vec![
                root.join("batch_a").join("ejecucion(1)"),
                root.join("ejecucion(2)"),
            ]
        );
    }

    #[test]
    fn test_discover_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let err = discover_experiments(&temp_dir.path().join("nope"), "ejecucion(").unwrap_err();
        assert!(matches!(err, PipelineError::RootNotFound(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_walk_files_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/informe_pids.csv"), "").unwrap();
        fs::write(root.join("a/b/informe_pids.csv"), "").unwrap();
        fs::write(root.join("a/b/informe_pids.csv.bak"), "").unwrap();

        let found = walk_files(root, |p| p.ends_with("informe_pids.csv")).unwrap();
        assert_eq!(
            found,
            vec![root.join("a/b/informe_pids.csv"), root.join("a/informe_pids.csv")]
        );
    }

    #[test]
    fn test_classify_messy() {
        let temp_dir = TempDir::new().unwrap();
        let exp = temp_dir.path();
        fs::write(exp.join("ecofloc_nodeA_cpu.txt"), "").unwrap();
        fs::write(exp.join("limbo_results_x.csv"), "").unwrap();
        fs::write(exp.join("informe_pids.csv"), "").unwrap();

        let classified = classify(exp).unwrap();
        assert!(classified.is_messy());
        assert_eq!(classified.loose_traces.len(), 2);
    }

    #[test]
    fn test_classify_requires_energy_trace() {
        let temp_dir = TempDir::new().unwrap();
        let exp = temp_dir.path();
        // Benchmark logs alone do not make a folder messy
        fs::write(exp.join("limbo_results_x.csv"), "").unwrap();

        assert_eq!(classify(exp).unwrap().state, LayoutState::WellFormed);
    }

    #[test]
    fn test_classify_with_raw_results_is_well_formed() {
        let temp_dir = TempDir::new().unwrap();
        let exp = temp_dir.path();
        fs::create_dir_all(exp.join("raw_results")).unwrap();
        fs::write(exp.join("ecofloc_nodeA_cpu.txt"), "").unwrap();

        assert_eq!(classify(exp).unwrap().state, LayoutState::WellFormed);
    }
}
