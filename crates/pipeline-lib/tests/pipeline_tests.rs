//! End-to-end pipeline tests over a temporary experiment tree

use pipeline_lib::mapping::{backup_path, HeaderClassifier};
use pipeline_lib::{ErrorLog, LayoutState, Pipeline, PipelineConfig, Stage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RAW_TRACE: &str = "ecofloc -p 4711 -i 100\n\
                         timestamp,pid,energy,power\n\
                         2025-06-01 12:00:01.100,4711,3.0,0.5\n\
                         2025-06-01 12:00:01.900,4711,4.0,0.5\n\
                         2025-06-01 12:00:02.050,4711,5.0,0.5\n";

const MAPPING: &str = "node_name,container_id,name_pid,pid,ppid,cmd\n\
                       nitro5-AN515,c1,java,100,1,java -jar app.jar\n\
                       node_name,container_id,name_pid,pid,ppid,cmd\n\
                       worker-aspire,c2,nginx,200,1,nginx\n";

/// One messy and one already-canonical experiment folder
fn build_tree(root: &Path) -> (PathBuf, PathBuf) {
    let messy = root.join("campaign").join("ejecucion(1)");
    fs::create_dir_all(&messy).unwrap();
    fs::write(messy.join("ecofloc_nodeA_cpu.txt"), RAW_TRACE).unwrap();
    fs::write(messy.join("limbo_results_x.csv"), "Target Time,Load Intensity\n").unwrap();
    fs::write(messy.join("informe_pids.csv"), MAPPING).unwrap();

    let tidy = root.join("ejecucion(2)");
    let ecofloc = tidy.join("raw_results/ecofloc");
    fs::create_dir_all(&ecofloc).unwrap();
    fs::create_dir_all(tidy.join("raw_results/limbo")).unwrap();
    fs::create_dir_all(tidy.join("raw_results/scaph")).unwrap();
    fs::write(ecofloc.join("ecofloc_leo_ram.txt"), "h1\nh2\nTotal: 0\n").unwrap();
    fs::write(tidy.join("informe_pids.csv"), "nodo_name,pid,name_pid\nleo,1,java\n").unwrap();

    (messy, tidy)
}

#[test]
fn test_full_run_normalizes_cleans_and_resamples() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let (messy, tidy) = build_tree(root);

    let config = PipelineConfig::with_root(root);
    let mut log = ErrorLog::create(config.error_log_path()).unwrap();
    let pipeline = Pipeline::new(config);
    let summary = pipeline.run(&mut log).unwrap();

    let stages: Vec<&str> = summary.stages.iter().map(|s| s.stage.as_str()).collect();
    assert_eq!(stages, vec!["normalize", "dedup-headers", "standardize", "resample"]);

    // Normalization
    assert!(messy.join("raw_results/ecofloc/ecofloc_nodeA_cpu.txt").is_file());
    assert!(messy.join("raw_results/limbo/limbo_results_x.csv").is_file());
    assert!(!messy.join("ecofloc_nodeA_cpu.txt").exists());
    let normalize = summary.stage("normalize").unwrap();
    assert_eq!(normalize.found, 2);
    assert_eq!(normalize.modified, 1);

    // Mapping cleanup
    assert!(backup_path(&messy.join("informe_pids.csv")).is_file());
    assert_eq!(
        fs::read_to_string(messy.join("informe_pids.csv")).unwrap(),
        "node_name,container_id,name_pid,pid,ppid,cmd\n\
         nitro5,c1,java,100,1,java -jar app.jar\n\
         aspire,c2,nginx,200,1,nginx\n"
    );

    // Resampling
    assert_eq!(
        fs::read_to_string(messy.join("clean_results/ecofloc/ecofloc_nodeA_cpu.txt")).unwrap(),
        "ecofloc -p 4711 -i 100\n\
         timestamp,pid,energy,power\n\
         2025-06-01 12:00:01,7.0\n\
         2025-06-01 12:00:02,5.0\n"
    );
    assert!(!tidy.join("clean_results/ecofloc/ecofloc_leo_ram.txt").exists());

    // Two recovered failures: the 3-column mapping file and the empty trace
    assert_eq!(summary.total_errors(), 2);
    assert_eq!(summary.stage("standardize").unwrap().errored(), 1);
    assert_eq!(summary.stage("resample").unwrap().errored(), 1);

    let log_text = fs::read_to_string(root.join("errors.log")).unwrap();
    assert_eq!(log_text.lines().count(), 2);
    assert!(log_text.contains("[standardize]"));
    assert!(log_text.contains("no parseable energy rows"));
}

#[test]
fn test_second_run_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let (messy, _) = build_tree(root);

    let pipeline = Pipeline::new(PipelineConfig::with_root(root));
    let mut log = ErrorLog::create(root.join("errors.log")).unwrap();
    pipeline.run(&mut log).unwrap();

    let mapping_after_first = fs::read_to_string(messy.join("informe_pids.csv")).unwrap();
    let clean_path = messy.join("clean_results/ecofloc/ecofloc_nodeA_cpu.txt");
    let clean_after_first = fs::read_to_string(&clean_path).unwrap();

    let mut log = ErrorLog::create(root.join("errors.log")).unwrap();
    let summary = pipeline.run(&mut log).unwrap();

    let normalize = summary.stage("normalize").unwrap();
    assert_eq!(normalize.modified, 0);
    assert_eq!(normalize.changes, 0);
    assert_eq!(summary.stage("dedup-headers").unwrap().changes, 0);
    assert_eq!(summary.stage("standardize").unwrap().modified, 0);

    assert_eq!(fs::read_to_string(messy.join("informe_pids.csv")).unwrap(), mapping_after_first);
    assert_eq!(fs::read_to_string(&clean_path).unwrap(), clean_after_first);

    // Retained mapping lines never re-classify as headers
    let classifier = HeaderClassifier::default();
    assert!(mapping_after_first.lines().skip(1).all(|l| !classifier.is_header(l)));
}

#[test]
fn test_single_stage_without_backups() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let (messy, _) = build_tree(root);

    let mut config = PipelineConfig::with_root(root);
    config.make_backup = false;
    let pipeline = Pipeline::new(config);
    let mut log = ErrorLog::create(root.join("errors.log")).unwrap();

    let summary = pipeline.run_stages(&[Stage::DedupHeaders], &mut log).unwrap();
    assert_eq!(summary.stages.len(), 1);
    assert_eq!(summary.stages[0].changes, 1);
    assert!(!backup_path(&messy.join("informe_pids.csv")).exists());

    // Nothing else ran
    assert!(messy.join("ecofloc_nodeA_cpu.txt").is_file());
    let scan = pipeline.scan().unwrap();
    assert_eq!(scan[0].state, LayoutState::Messy);
}
