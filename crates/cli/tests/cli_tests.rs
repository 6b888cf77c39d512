//! CLI integration tests

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn expclean(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_expclean"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn messy_root() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let exp = temp_dir.path().join("ejecucion(1)");
    fs::create_dir_all(&exp).unwrap();
    fs::write(
        exp.join("ecofloc_nodeA_cpu.txt"),
        "header one\nheader two\n\
         2025-06-01 12:00:01.100,1,3.0,0\n\
         2025-06-01 12:00:01.900,1,4.0,0\n\
         2025-06-01 12:00:02.050,1,5.0,0\n",
    )
    .unwrap();
    fs::write(
        exp.join("informe_pids.csv"),
        "node_name,container_id,name_pid,pid,ppid,cmd\n\
         Nitro-5,c1,java,1,0,java\n\
         node_name,container_id,name_pid,pid,ppid,cmd\n",
    )
    .unwrap();
    temp_dir
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = expclean(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Experiment telemetry cleaning pipeline"),
        "Should show app description"
    );
    for command in ["run", "normalize", "dedup-headers", "standardize", "resample", "scan"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--no-backup"), "Should show no-backup option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = expclean(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("expclean"), "Should show binary name");
}

/// Test a full run over a messy experiment folder
#[test]
fn test_run_pipeline() {
    let temp_dir = messy_root();
    let root = temp_dir.path();

    let output = expclean(&["--root", arg(root), "--no-backup", "run"]);
    assert!(output.status.success(), "Run should succeed");

    let exp = root.join("ejecucion(1)");
    assert!(exp.join("raw_results/ecofloc/ecofloc_nodeA_cpu.txt").is_file());
    assert_eq!(
        fs::read_to_string(exp.join("clean_results/ecofloc/ecofloc_nodeA_cpu.txt")).unwrap(),
        "header one\nheader two\n2025-06-01 12:00:01,7.0\n2025-06-01 12:00:02,5.0\n"
    );
    assert_eq!(
        fs::read_to_string(exp.join("informe_pids.csv")).unwrap(),
        "node_name,container_id,name_pid,pid,ppid,cmd\nnitro5,c1,java,1,0,java\n"
    );
    assert!(!exp.join("informe_pids.csv.bak").exists());

    // Error log exists and is empty on a clean run
    assert_eq!(fs::read_to_string(root.join("errors.log")).unwrap(), "");
}

/// Test that a missing root aborts with a failure status
#[test]
fn test_missing_root_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nowhere");

    let output = expclean(&["--root", arg(&missing), "run"]);
    assert!(!output.status.success(), "Run on a missing root should fail");
}

/// Test scan output as JSON
#[test]
fn test_scan_json() {
    let temp_dir = messy_root();

    let output = expclean(&["--root", arg(temp_dir.path()), "--format", "json", "scan"]);
    assert!(output.status.success(), "Scan should succeed");

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let experiments = parsed.as_array().unwrap();
    assert_eq!(experiments.len(), 1);
    assert_eq!(experiments[0]["state"], "messy");
    assert_eq!(experiments[0]["has_mapping"], true);

    // Scan is read-only
    assert!(temp_dir.path().join("ejecucion(1)/ecofloc_nodeA_cpu.txt").is_file());
}

fn variant_root() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let exp = temp_dir.path().join("ejecucion(1)");
    fs::create_dir_all(&exp).unwrap();
    fs::write(
        exp.join("informe_pids.csv"),
        "node_name,container_id,name_pid,pid,ppid,cmd\n\
         leo,c1,java,1,0,java\n\
         node_name,container_id,name_pid,pid,ppid,cmd\n\
         nodo,containerid,name,pid,ppid,cmd\n\
         aspire,c2,nginx,2,0,nginx\n",
    )
    .unwrap();
    let clean = temp_dir.path().join("ejecucion(2)");
    fs::create_dir_all(&clean).unwrap();
    fs::write(
        clean.join("informe_pids.csv"),
        "node_name,container_id,name_pid,pid,ppid,cmd\nleo,c3,java,3,0,java\n",
    )
    .unwrap();
    temp_dir
}

/// Test dedup-headers JSON carries stage counts and header variants
#[test]
fn test_dedup_headers_json() {
    let temp_dir = variant_root();

    let output = expclean(&["--root", arg(temp_dir.path()), "--format", "json", "dedup-headers"]);
    assert!(output.status.success(), "dedup-headers should succeed");

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["stage"], "dedup-headers");
    assert_eq!(parsed["found"], 2);
    assert_eq!(parsed["processed"], 2);
    assert_eq!(parsed["modified"], 1);
    assert_eq!(parsed["unchanged"], 1);
    assert_eq!(parsed["changes"], 2);
    assert_eq!(parsed["failures"].as_array().unwrap().len(), 0);

    let files = parsed["files"].as_array().unwrap();
    let messy = files
        .iter()
        .find(|f| f["headers_removed"] == 2)
        .expect("modified file should be listed");
    assert_eq!(messy["duplicates"], 1);
    assert_eq!(messy["variants"], 1);

    let variants = messy["header_variants"].as_array().unwrap();
    assert_eq!(variants.len(), 2);
    let kept: Vec<&str> = variants
        .iter()
        .filter(|v| v["kept"] == true)
        .map(|v| v["text"].as_str().unwrap())
        .collect();
    assert_eq!(kept, vec!["node_name,container_id,name_pid,pid,ppid,cmd"]);
    assert!(variants
        .iter()
        .any(|v| v["kept"] == false && v["text"] == "nodo,containerid,name,pid,ppid,cmd"));
}

/// Test dedup-headers table output lists variant texts and counts
#[test]
fn test_dedup_headers_table() {
    let temp_dir = variant_root();

    let output = expclean(&["--root", arg(temp_dir.path()), "--no-backup", "dedup-headers"]);
    assert!(output.status.success(), "dedup-headers should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Files Found:           2"));
    assert!(stdout.contains("Files Processed:       2"));
    assert!(stdout.contains("Total Headers Removed: 2"));
    assert!(stdout.contains("[kept] node_name,container_id,name_pid,pid,ppid,cmd"));
    assert!(stdout.contains("[removed] nodo,containerid,name,pid,ppid,cmd"));
    assert!(!temp_dir
        .path()
        .join("ejecucion(1)/informe_pids.csv.bak")
        .exists());
}
