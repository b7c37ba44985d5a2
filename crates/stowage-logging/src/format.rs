//! Rendering log records as JSON lines or colored text blocks.

use std::fmt;

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Severity of a logged error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Logged, the process keeps running.
    Error,
    /// Logged, then the process exits with status 1.
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub time: String,
    pub cause: String,
    pub trace: Vec<String>,
}

/// Column the trace index is right-aligned to.
const TRACE_INDEX_WIDTH: usize = 8;

/// Single-line JSON document.
pub fn render_json(record: &LogRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(record)
}

/// Multi-line console report: the numbered trace followed by a bold red
/// summary line.
pub fn render_text(record: &LogRecord) -> String {
    let trace = record
        .trace
        .iter()
        .enumerate()
        .map(|(i, entry)| match i {
            0 => format!("1: {}", entry),
            _ => format!("{:>width$}: {}", i + 1, entry, width = TRACE_INDEX_WIDTH),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let summary = format!(
        "[{}] [{}] {} ({})",
        record.time, record.level, record.message, record.cause
    );

    format!("\nTrace: {}\n{}", trace, summary.bold().red())
}
