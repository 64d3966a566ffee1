//! Console output
//!
//! Streams per-request lines as probes complete and prints the final
//! summary as text or JSON to any writer (stdout in the binary).

use crate::config::{LineFormat, SummaryFormat};
use crate::output::line::format_line;
use crate::output::stats::{as_millis_f64, StatusClassCounts, Summary};
use crate::output::traits::{OutputHandler, OutputResult, RunReport};
use crate::probe::ProbeResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Output handler writing to a [`Write`] implementation
pub struct ConsoleOutput<W: Write> {
    writer: W,
    line_format: LineFormat,
    summary_format: SummaryFormat,
}

impl<W: Write> ConsoleOutput<W> {
    pub fn new(writer: W, line_format: LineFormat, summary_format: SummaryFormat) -> Self {
        Self {
            writer,
            line_format,
            summary_format,
        }
    }

    /// Gives back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputHandler for ConsoleOutput<W> {
    fn on_result(&mut self, result: &ProbeResult) -> OutputResult<()> {
        if let Some(line) = format_line(result, self.line_format) {
            writeln!(self.writer, "{}", line)?;
        }
        Ok(())
    }

    fn on_finish(&mut self, report: &RunReport) -> OutputResult<()> {
        match self.summary_format {
            SummaryFormat::Text => write_text_summary(&mut self.writer, report)?,
            SummaryFormat::Json => {
                let document = SummaryDocument::from_report(report);
                serde_json::to_writer_pretty(&mut self.writer, &document)?;
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the human-readable summary
pub fn write_text_summary<W: Write>(writer: &mut W, report: &RunReport) -> OutputResult<()> {
    writeln!(writer)?;
    writeln!(writer, "=== Probe Summary ===")?;

    let summary = match &report.summary {
        Some(summary) => summary,
        None => {
            writeln!(writer, "No results recorded")?;
            return Ok(());
        }
    };

    for (outcome, count) in summary.sorted_counts() {
        writeln!(writer, "{}: {}", outcome, count)?;
    }

    writeln!(writer, "Total URLs: {}", summary.total)?;
    writeln!(
        writer,
        "Average time: {:.0}ms",
        as_millis_f64(summary.average)
    )?;
    writeln!(writer, "Median time: {:.0}ms", as_millis_f64(summary.median))?;
    writeln!(writer, "Max time: {:.0}ms", as_millis_f64(summary.max))?;
    writeln!(
        writer,
        "Success rate: {:.1}% ({:.1} ok req/s)",
        summary.ok_ratio() * 100.0,
        summary.ok_per_second(summary.window)
    )?;

    Ok(())
}

/// Machine-readable summary
///
/// Times are in whole milliseconds. `time` is the probe window, from the
/// earliest probe start to the latest probe end, and `okReqsSec` is measured
/// over that same window.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    pub total_urls: u64,
    pub time: u64,
    pub avg: Option<u64>,
    pub median: Option<u64>,
    pub max: Option<u64>,
    pub ok_reqs_sec: f64,
    pub ok_reqs_pct: f64,
    pub avg_body_length: Option<u64>,
    pub peak_concurrency: usize,
    #[serde(flatten)]
    pub classes: StatusClassCounts,
    pub counts: BTreeMap<String, u64>,
}

impl SummaryDocument {
    pub fn from_report(report: &RunReport) -> Self {
        match &report.summary {
            Some(summary) => Self::from_summary(summary, report),
            None => Self {
                total_urls: 0,
                time: 0,
                avg: None,
                median: None,
                max: None,
                ok_reqs_sec: 0.0,
                ok_reqs_pct: 0.0,
                avg_body_length: None,
                peak_concurrency: report.peak_concurrency,
                classes: StatusClassCounts::default(),
                counts: BTreeMap::new(),
            },
        }
    }

    fn from_summary(summary: &Summary, report: &RunReport) -> Self {
        let round_ms = |d: std::time::Duration| as_millis_f64(d).round() as u64;

        Self {
            total_urls: summary.total,
            time: summary.window.as_millis() as u64,
            avg: Some(round_ms(summary.average)),
            median: Some(round_ms(summary.median)),
            max: Some(round_ms(summary.max)),
            ok_reqs_sec: summary.ok_per_second(summary.window).round(),
            ok_reqs_pct: (summary.ok_ratio() * 100.0).round() / 100.0,
            avg_body_length: summary.average_ok_body_length(),
            peak_concurrency: report.peak_concurrency,
            classes: summary.classes,
            counts: summary
                .counts
                .iter()
                .map(|(outcome, count)| (outcome.to_string(), *count))
                .collect(),
        }
    }
}
