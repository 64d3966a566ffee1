//! Per-request line formatting
//!
//! The CSV layout is read by downstream log scrapers; keep its field order.

use crate::config::LineFormat;
use crate::probe::ProbeResult;

/// Formats one result, or `None` for [`LineFormat::None`]
///
/// * CSV: `<url>,<outcome>,<start_rfc3339>,<duration_ms>,<body_length>`,
///   with body length `0` when the body was not read
/// * Human: `<url> - <outcome> - <seconds>s`
pub fn format_line(result: &ProbeResult, format: LineFormat) -> Option<String> {
    match format {
        LineFormat::Csv => Some(format!(
            "{},{},{},{},{}",
            result.url,
            result.outcome,
            result.started_at.to_rfc3339(),
            result.duration.as_millis(),
            result.response_size.unwrap_or(0)
        )),
        LineFormat::Human => Some(format!(
            "{} - {} - {:.3}s",
            result.url,
            result.outcome,
            result.duration.as_secs_f64()
        )),
        LineFormat::None => None,
    }
}
