//! Duplicate and variant header removal for process-mapping files
//!
//! Repeated tool invocations append their own header line to the mapping
//! file, sometimes with a different column order. The first non-empty
//! line is the primary header and is always kept; every later line that
//! looks like a header is dropped.

use crate::error::{PipelineError, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Substrings that mark a field as a column name
pub const HEADER_KEYWORDS: &[&str] = &[
    "node",
    "nodo",
    "container",
    "containerid",
    "containername",
    "pid",
    "ppid",
    "cmd",
    "name",
    "name_pid",
    "timestamp",
    "time",
    "cpu",
    "memory",
    "ram",
];

/// Minimum share of keyword-bearing fields for a line to count as a header (inclusive)
pub const HEADER_THRESHOLD: f64 = 0.4;

/// Result of classifying a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Data,
}

/// Keyword-density header detector
#[derive(Debug, Clone)]
pub struct HeaderClassifier {
    keywords: Vec<String>,
    threshold: f64,
}

impl Default for HeaderClassifier {
    fn default() -> Self {
        Self::new(HEADER_KEYWORDS.iter().copied(), HEADER_THRESHOLD)
    }
}

impl HeaderClassifier {
    pub fn new<I, S>(keywords: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Share of delimited fields containing at least one keyword
    ///
    /// Fields are split on `,`, `;` and tab; empty fields still count
    /// towards the denominator. Returns `None` for a blank line.
    pub fn keyword_ratio(&self, line: &str) -> Option<f64> {
        let line = line.trim().to_lowercase();
        if line.is_empty() {
            return None;
        }

        let fields: Vec<&str> = line.split(&[',', ';', '\t'][..]).collect();
        let matches = fields
            .iter()
            .filter(|field| {
                let field = field.trim();
                self.keywords.iter().any(|k| field.contains(k.as_str()))
            })
            .count();

        Some(matches as f64 / fields.len() as f64)
    }

    pub fn classify(&self, line: &str) -> LineKind {
        match self.keyword_ratio(line) {
            Some(ratio) if ratio >= self.threshold => LineKind::Header,
            _ => LineKind::Data,
        }
    }

    pub fn is_header(&self, line: &str) -> bool {
        self.classify(line) == LineKind::Header
    }
}

/// Why a header-like line was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalKind {
    /// Same text as the primary header
    Duplicate,
    /// Header-like line with different text
    Variant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedLine {
    /// One-based line number in the original file
    pub line_no: usize,
    pub text: String,
    pub kind: RemovalKind,
}

/// Outcome of cleaning one file's content
#[derive(Debug, Clone, Default)]
pub struct HeaderScan {
    /// First non-empty line, trimmed
    pub primary: Option<String>,
    pub removed: Vec<RemovedLine>,
    /// Every distinct header text seen, primary included
    pub variants: BTreeSet<String>,
}

impl HeaderScan {
    pub fn headers_removed(&self) -> usize {
        self.removed.len()
    }
}

/// Drop every header-like line after the primary header
///
/// Retained lines keep their original terminators and order; blank lines
/// are kept verbatim.
pub fn strip_repeated_headers(content: &str, classifier: &HeaderClassifier) -> (String, HeaderScan) {
    let mut cleaned = String::with_capacity(content.len());
    let mut scan = HeaderScan::default();

    for (idx, line) in content.split_inclusive('\n').enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            cleaned.push_str(line);
            continue;
        }

        let Some(primary) = scan.primary.as_deref() else {
            scan.primary = Some(trimmed.to_string());
            scan.variants.insert(trimmed.to_string());
            cleaned.push_str(line);
            continue;
        };

        if classifier.is_header(trimmed) {
            let kind = if trimmed == primary {
                RemovalKind::Duplicate
            } else {
                RemovalKind::Variant
            };
            debug!(line_no = idx + 1, kind = ?kind, text = %trimmed, "Removing header line");
            scan.variants.insert(trimmed.to_string());
            scan.removed.push(RemovedLine {
                line_no: idx + 1,
                text: trimmed.to_string(),
                kind,
            });
        } else {
            cleaned.push_str(line);
        }
    }

    (cleaned, scan)
}

/// Outcome of cleaning one file on disk
#[derive(Debug, Clone, Default)]
pub struct HeaderCleanOutcome {
    pub scan: HeaderScan,
    /// Backup written before the rewrite, if any
    pub backup: Option<PathBuf>,
}

impl HeaderCleanOutcome {
    pub fn modified(&self) -> bool {
        self.scan.headers_removed() > 0
    }
}

/// Header cleaner bound to a classifier and backup policy
#[derive(Debug, Clone)]
pub struct HeaderCleaner {
    classifier: HeaderClassifier,
    make_backup: bool,
}

impl HeaderCleaner {
    pub fn new(classifier: HeaderClassifier, make_backup: bool) -> Self {
        Self {
            classifier,
            make_backup,
        }
    }

    pub fn classifier(&self) -> &HeaderClassifier {
        &self.classifier
    }

    /// Clean a file in place
    ///
    /// Empty or whitespace-only files, and files without extra headers,
    /// are left untouched and get no backup.
    pub fn clean_file(&self, path: &Path) -> Result<HeaderCleanOutcome> {
        let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let (cleaned, scan) = strip_repeated_headers(&content, &self.classifier);

        let mut outcome = HeaderCleanOutcome { scan, backup: None };
        if !outcome.modified() {
            debug!(path = %path.display(), "No additional headers found");
            return Ok(outcome);
        }

        if self.make_backup {
            let backup = backup_path(path);
            fs::copy(path, &backup).map_err(|e| PipelineError::io(&backup, e))?;
            outcome.backup = Some(backup);
        }

        fs::write(path, cleaned).map_err(|e| PipelineError::io(path, e))?;
        info!(
            path = %path.display(),
            removed = outcome.scan.headers_removed(),
            variants = outcome.scan.variants.len(),
            "Removed repeated header lines"
        );
        Ok(outcome)
    }
}

/// Sibling backup path: `informe_pids.csv` -> `informe_pids.csv.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}
