//! Pipeline execution commands

use anyhow::{Context, Result};
use colored::Colorize;
use pipeline_lib::{ErrorLog, Pipeline, PipelineSummary, Stage, StageReport};
use serde::Serialize;
use tabled::Tabled;
use tracing::error;

use crate::output::{color_errors, print_error, print_success, print_table, print_warning, OutputFormat};

/// Row for the per-stage summary table
#[derive(Tabled, Serialize)]
struct StageRow {
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "Found")]
    found: usize,
    #[tabled(rename = "Modified")]
    modified: usize,
    #[tabled(rename = "Unchanged")]
    unchanged: usize,
    #[tabled(rename = "Changes")]
    changes: usize,
    #[tabled(rename = "Errors")]
    errors: String,
}

impl From<&StageReport> for StageRow {
    fn from(report: &StageReport) -> Self {
        Self {
            stage: report.stage.clone(),
            found: report.found,
            modified: report.modified,
            unchanged: report.unchanged,
            changes: report.changes,
            errors: color_errors(report.errored()),
        }
    }
}

/// Open the error log at the root, failing if the root is missing
pub fn open_error_log(pipeline: &Pipeline) -> Result<ErrorLog> {
    let root = &pipeline.config().root;
    if !root.is_dir() {
        anyhow::bail!("Root directory does not exist: {}", root.display());
    }

    let path = pipeline.config().error_log_path();
    ErrorLog::create(&path).with_context(|| format!("Failed to create {}", path.display()))
}

/// Run the given stages and print their summary
///
/// An error escaping the stage loops is written to the error log before
/// it propagates.
pub fn run_stages(pipeline: &Pipeline, stages: &[Stage], format: OutputFormat) -> Result<()> {
    let mut error_log = open_error_log(pipeline)?;

    let summary = match pipeline.run_stages(stages, &mut error_log) {
        Ok(summary) => summary,
        Err(e) => {
            let message = format!("CRITICAL ERROR IN PROCESSING PIPELINE: {}", e);
            error!(error = %e, "Pipeline aborted");
            if let Err(log_err) = error_log.record(&message) {
                print_error(&format!("Could not write error log: {}", log_err));
            }
            return Err(e).context("Pipeline execution aborted");
        }
    };

    print_summary(&summary, &error_log, format)
}

fn print_summary(summary: &PipelineSummary, error_log: &ErrorLog, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("{}", "Processing Summary".bold());
    println!("{}", "=".repeat(60));
    let rows: Vec<StageRow> = summary.stages.iter().map(StageRow::from).collect();
    print_table(&rows, format);

    let errors = summary.total_errors();
    if errors == 0 {
        print_success("All stages completed without errors");
        return Ok(());
    }

    print_warning(&format!(
        "{} item(s) failed; details in {}",
        errors,
        error_log.path().display()
    ));
    for report in &summary.stages {
        for failure in &report.failures {
            println!("  {} {}", format!("[{}]", report.stage).dimmed(), failure);
        }
    }
    Ok(())
}
