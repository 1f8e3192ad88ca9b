//! Machine-readable batch reports.
//!
//! JSON writes one summary object per batch; JSON Lines writes one
//! [`JobOutcome`] per line so reports can be streamed and concatenated.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{BatchReport, ExecutionMode, JobOutcome};

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One summary object per batch
    Json,
    /// One outcome object per line (newline-delimited JSON)
    JsonLines,
}

impl ReportFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Serializable view of a [`BatchReport`].
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub mode: ExecutionMode,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_ms: f64,
    pub outcomes: &'a [JobOutcome],
}

impl<'a> From<&'a BatchReport> for ReportSummary<'a> {
    fn from(report: &'a BatchReport) -> Self {
        Self {
            mode: report.mode,
            total: report.len(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            elapsed_ms: report.elapsed.as_secs_f64() * 1000.0,
            outcomes: &report.outcomes,
        }
    }
}

/// Writes batch reports to any `Write` sink.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pretty: bool,
    records_written: usize,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: ReportFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            records_written: 0,
        }
    }

    /// Write one batch report.
    pub fn write_report(&mut self, report: &BatchReport) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => {
                let summary = ReportSummary::from(report);
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, &summary)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, &summary).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.records_written += 1;
            }
            ReportFormat::JsonLines => {
                for outcome in &report.outcomes {
                    serde_json::to_writer(&mut self.writer, outcome).map_err(io::Error::other)?;
                    writeln!(self.writer)?;
                    self.records_written += 1;
                }
            }
        }
        Ok(())
    }

    /// Number of JSON records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::types::Outcome;
    use std::path::PathBuf;
    use std::time::Duration;

    fn report() -> BatchReport {
        BatchReport {
            mode: ExecutionMode::Sequential,
            outcomes: vec![
                JobOutcome {
                    source: PathBuf::from("images/a.png"),
                    dest: PathBuf::from("images/output/a.png"),
                    outcome: Outcome::Success,
                },
                JobOutcome {
                    source: PathBuf::from("images/b.png"),
                    dest: PathBuf::from("images/output/b.png"),
                    outcome: Outcome::Failure(PipelineError::Load {
                        path: PathBuf::from("images/b.png"),
                        message: "missing".into(),
                    }),
                },
            ],
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_write_json_summary() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, ReportFormat::Json, false);
        writer.write_report(&report()).unwrap();
        assert_eq!(writer.records_written(), 1);

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["mode"], "sequential");
        assert_eq!(value["total"], 2);
        assert_eq!(value["succeeded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["outcomes"][1]["outcome"]["error"]["kind"], "load");
    }

    #[test]
    fn test_write_jsonl_one_line_per_outcome() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, ReportFormat::JsonLines, true);
        writer.write_report(&report()).unwrap();
        assert_eq!(writer.records_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"status\":\"success\""));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ReportFormat::parse("json"), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::parse("NDJSON"), Some(ReportFormat::JsonLines));
        assert_eq!(ReportFormat::parse("csv"), None);
    }
}
