//! Read-only experiment listing

use anyhow::Result;
use pipeline_lib::{ExperimentSummary, Pipeline};
use tabled::Tabled;

use crate::output::{color_state, format_flag, print_table, OutputFormat};

/// Row for the experiment table
#[derive(Tabled, serde::Serialize)]
struct ExperimentRow {
    #[tabled(rename = "Experiment")]
    name: String,
    #[tabled(rename = "Layout")]
    state: String,
    #[tabled(rename = "Raw Traces")]
    raw: usize,
    #[tabled(rename = "Clean Traces")]
    clean: usize,
    #[tabled(rename = "Mapping")]
    mapping: String,
    #[tabled(rename = "Benchmark Log")]
    benchmark: String,
}

impl From<&ExperimentSummary> for ExperimentRow {
    fn from(summary: &ExperimentSummary) -> Self {
        Self {
            name: summary.name.clone(),
            state: color_state(summary.state),
            raw: summary.raw_energy_traces,
            clean: summary.clean_energy_traces,
            mapping: format_flag(summary.has_mapping),
            benchmark: summary
                .benchmark_log
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// List experiment folders with their layout state
pub fn show_experiments(pipeline: &Pipeline, format: OutputFormat) -> Result<()> {
    let summaries = pipeline.scan()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        OutputFormat::Table => {
            let rows: Vec<ExperimentRow> = summaries.iter().map(ExperimentRow::from).collect();
            print_table(&rows, format);
            println!("\nTotal: {} experiments", summaries.len());
        }
    }

    Ok(())
}
