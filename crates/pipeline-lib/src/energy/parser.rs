//! Raw energy trace parsing
//!
//! A trace starts with provenance lines that are carried through
//! untouched, followed by comma-separated samples such as
//! `2025-06-01 12:00:01.100,4711,3.0,0.8`.

use chrono::{DateTime, NaiveDateTime};

/// Lines starting with these are tool summaries, not samples
pub const SUMMARY_PREFIXES: &[&str] = &["Average", "Total"];

/// Accepted textual timestamp layouts
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// One parsed sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySample {
    pub timestamp: NaiveDateTime,
    pub energy: f64,
}

/// A trace split into provenance lines and samples
#[derive(Debug, Clone, Default)]
pub struct ParsedTrace {
    /// Leading lines without their terminators
    pub headers: Vec<String>,
    pub samples: Vec<EnergySample>,
    /// Non-blank lines after the provenance block that were not samples
    pub dropped: usize,
}

impl ParsedTrace {
    pub fn total_energy(&self) -> f64 {
        self.samples.iter().map(|s| s.energy).sum()
    }
}

/// Parse a timestamp cell
///
/// Accepts the layouts in `TIMESTAMP_FORMATS`, RFC 3339 with an offset
/// (kept as wall-clock time), and bare Unix epoch seconds.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }

    let epoch: f64 = value.parse().ok()?;
    if !epoch.is_finite() {
        return None;
    }
    let secs = epoch.floor();
    let nanos = ((epoch - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos).map(|dt| dt.naive_utc())
}

/// Parse one data line, `None` when it is not a sample
pub fn parse_line(line: &str, energy_column: usize) -> Option<EnergySample> {
    let line = line.trim();
    if line.is_empty() || SUMMARY_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return None;
    }

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 3 || fields.len() <= energy_column {
        return None;
    }

    let timestamp = parse_timestamp(fields[0])?;
    let energy: f64 = fields[energy_column].trim().parse().ok()?;
    if !energy.is_finite() {
        return None;
    }

    Some(EnergySample { timestamp, energy })
}

/// Split trace content into `header_lines` provenance lines and samples
pub fn parse_trace(content: &str, header_lines: usize, energy_column: usize) -> ParsedTrace {
    let mut lines = content.lines();
    let mut trace = ParsedTrace {
        headers: lines.by_ref().take(header_lines).map(str::to_string).collect(),
        ..Default::default()
    };

    for line in lines {
        match parse_line(line, energy_column) {
            Some(sample) => trace.samples.push(sample),
            None if line.trim().is_empty() => {}
            None => trace.dropped += 1,
        }
    }

    trace
}
