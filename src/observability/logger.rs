//! Structured JSON logger
//!
//! - One log line = one event
//! - Deterministic key ordering (alphabetical by field key)
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info,
    /// Recoverable issues
    Warn,
    /// Operation failures
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that outputs JSON lines to stdout
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        Self::log_to_writer(severity, event, fields, &mut io::stdout());
    }

    fn log_to_writer(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut impl Write,
    ) {
        let mut sorted: Vec<(&str, &str)> = fields.to_vec();
        sorted.sort_by_key(|&(key, _)| key);

        let mut line = format!(
            "{{\"severity\":\"{}\",\"event\":\"{}\"",
            severity,
            escape(event)
        );
        for (key, value) in sorted {
            line.push_str(&format!(",\"{}\":\"{}\"", escape(key), escape(value)));
        }
        line.push('}');

        // A failed log write must not fail the operation being logged.
        let _ = writeln!(writer, "{}", line);
    }
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
