//! Standalone header cleanup command

use anyhow::Result;
use colored::Colorize;
use pipeline_lib::mapping::{HeaderCleanOutcome, RemovalKind};
use pipeline_lib::{Pipeline, StageReport};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use crate::commands::run::open_error_log;
use crate::output::{print_info, print_success, print_table, print_warning, OutputFormat};

/// A distinct header text seen in one file
#[derive(Serialize)]
struct HeaderVariant {
    text: String,
    kept: bool,
}

/// Per-file cleanup detail
#[derive(Serialize)]
struct FileDetail {
    file: String,
    duplicates: usize,
    variants: usize,
    headers_removed: usize,
    backup: Option<String>,
    header_variants: Vec<HeaderVariant>,
}

impl FileDetail {
    fn new(path: &Path, outcome: &HeaderCleanOutcome) -> Self {
        let scan = &outcome.scan;
        let count = |kind: RemovalKind| scan.removed.iter().filter(|line| line.kind == kind).count();

        let header_variants = scan
            .variants
            .iter()
            .map(|text| HeaderVariant {
                text: text.clone(),
                kept: scan.primary.as_deref() == Some(text.as_str()),
            })
            .collect();

        Self {
            file: path.display().to_string(),
            duplicates: count(RemovalKind::Duplicate),
            variants: count(RemovalKind::Variant),
            headers_removed: scan.headers_removed(),
            backup: outcome
                .backup
                .as_ref()
                .and_then(|b| b.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
            header_variants,
        }
    }
}

/// Row for the per-file cleanup table
#[derive(Tabled, Serialize)]
struct FileRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Duplicates")]
    duplicates: usize,
    #[tabled(rename = "Variants")]
    variants: usize,
    #[tabled(rename = "Header Formats")]
    formats: String,
    #[tabled(rename = "Backup")]
    backup: String,
}

impl From<&FileDetail> for FileRow {
    fn from(detail: &FileDetail) -> Self {
        let formats = detail
            .header_variants
            .iter()
            .map(|v| {
                let status = if v.kept { "kept" } else { "removed" };
                format!("[{}] {}", status, v.text)
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            file: detail.file.clone(),
            duplicates: detail.duplicates,
            variants: detail.variants,
            formats,
            backup: detail.backup.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Serialize)]
struct DedupReport<'a> {
    #[serde(flatten)]
    report: &'a StageReport,
    processed: usize,
    files: Vec<FileDetail>,
}

/// Remove repeated headers from every mapping file and report per file
pub fn dedup_headers(pipeline: &Pipeline, format: OutputFormat) -> Result<()> {
    let mut error_log = open_error_log(pipeline)?;
    let run = pipeline.dedup_headers()?;
    error_log.record_stage(&run.report)?;

    let details: Vec<FileDetail> = run
        .files
        .iter()
        .map(|(path, outcome)| FileDetail::new(path, outcome))
        .collect();
    let report = &run.report;
    let processed = run.files.len();

    if let OutputFormat::Json = format {
        let json = DedupReport {
            report,
            processed,
            files: details,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let rows: Vec<FileRow> = details
        .iter()
        .filter(|d| d.headers_removed > 0)
        .map(FileRow::from)
        .collect();
    if !rows.is_empty() {
        print_table(&rows, format);
    }

    println!();
    println!("{}", "Header Cleanup Summary".bold());
    println!("{}", "=".repeat(60));
    println!("Files Found:           {}", report.found);
    println!("Files Processed:       {}", processed);
    println!("Files Modified:        {}", report.modified);
    println!("Files Unchanged:       {}", report.unchanged);
    println!("Errors Encountered:    {}", report.errored());
    println!("Total Headers Removed: {}", report.changes);
    println!();

    if report.found == 0 {
        print_info("No mapping files found");
    } else if report.modified == 0 && report.is_clean() {
        print_success("All files were already clean");
    } else if report.modified > 0 {
        print_success("Duplicate and variant headers removed");
    }

    for failure in &report.failures {
        print_warning(&failure.to_string());
    }

    Ok(())
}
