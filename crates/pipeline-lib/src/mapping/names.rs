//! Node-name standardization for process-mapping files

use super::headers::HeaderClassifier;
use crate::error::{PipelineError, Result};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Column layout of a cleaned mapping file
pub const MAPPING_HEADER: [&str; 6] = ["node_name", "container_id", "name_pid", "pid", "ppid", "cmd"];

/// Ordered (substring, canonical name) rules; the first match wins.
/// `scorpius` precedes `leo` so composite names like `scorpius-leo` stay scorpius.
pub const NODE_RULES: &[(&str, &str)] = &[
    ("scorpius", "scorpius"),
    ("nitro", "nitro5"),
    ("aspire", "aspire"),
    ("leo", "leo"),
];

/// Canonical node name for a free-text identifier, if any rule matches
pub fn canonical_node(value: &str) -> Option<&'static str> {
    let lower = value.to_lowercase();
    NODE_RULES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, canonical)| *canonical)
}

/// Rewrite a node identifier, leaving unmatched values as they are
pub fn standardize_node(value: &str) -> Cow<'_, str> {
    match canonical_node(value) {
        Some(canonical) => Cow::Borrowed(canonical),
        None => Cow::Borrowed(value),
    }
}

/// Outcome of standardizing one mapping file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardizeOutcome {
    /// Data rows written (header excluded)
    pub rows: usize,
    /// Node values that changed
    pub changed: usize,
    /// Whether the file on disk was rewritten
    pub rewritten: bool,
}

/// Standardize the node column of a mapping file and reset its header
///
/// Blank and whitespace-only lines are dropped. Every other record must
/// have exactly six fields, otherwise the file is left untouched and `MalformedMapping` is returned. The first record is
/// replaced by [`MAPPING_HEADER`] when it looks like a header; a file
/// with no header keeps all its rows and gains one.
pub fn standardize_file(path: &Path, classifier: &HeaderClassifier) -> Result<StandardizeOutcome> {
    let original = fs::read(path).map_err(|e| PipelineError::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(original.as_slice());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() != MAPPING_HEADER.len() {
            return Err(PipelineError::MalformedMapping {
                path: path.to_path_buf(),
                expected: MAPPING_HEADER.len(),
                found: record.len(),
            });
        }
        records.push(record);
    }

    let first_is_header = records
        .first()
        .map(|r| classifier.is_header(&r.iter().collect::<Vec<_>>().join(",")))
        .unwrap_or(false);
    let data = if first_is_header { &records[1..] } else { &records[..] };

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(original.len()));
    let csv_err = |source: csv::Error| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    writer.write_record(MAPPING_HEADER).map_err(csv_err)?;

    let mut outcome = StandardizeOutcome::default();
    for record in data {
        let node = &record[0];
        let standardized = standardize_node(node);
        if standardized != node {
            debug!(from = %node, to = %standardized, "Standardized node name");
            outcome.changed += 1;
        }

        let mut fields: Vec<&str> = record.iter().collect();
        fields[0] = standardized.as_ref();
        writer.write_record(&fields).map_err(csv_err)?;
        outcome.rows += 1;
    }

    let rendered = writer
        .into_inner()
        .map_err(|e| PipelineError::io(path, e.into_error()))?;

    if rendered != original {
        fs::write(path, &rendered).map_err(|e| PipelineError::io(path, e))?;
        outcome.rewritten = true;
    }

    info!(
        path = %path.display(),
        rows = outcome.rows,
        changed = outcome.changed,
        "Standardized node names"
    );
    Ok(outcome)
}
