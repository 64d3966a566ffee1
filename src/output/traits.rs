//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and the
//! report handed to them when a batch finishes.

use crate::output::stats::Summary;
use crate::probe::ProbeResult;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything known once a batch has finished
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Aggregated statistics, `None` if no result was recorded
    pub summary: Option<Summary>,

    /// Wall-clock time of the whole batch
    pub elapsed: Duration,

    /// Highest number of probes that were in flight at once
    pub peak_concurrency: usize,
}

/// Receiver of per-request results and the final report
pub trait OutputHandler {
    /// Called once per result, in completion order
    fn on_result(&mut self, result: &ProbeResult) -> OutputResult<()>;

    /// Called once after every result has been delivered
    fn on_finish(&mut self, report: &RunReport) -> OutputResult<()>;
}

/// Handler that keeps every result in memory
#[derive(Debug, Default)]
pub struct CollectingOutput {
    pub results: Vec<ProbeResult>,
    pub report: Option<RunReport>,
}

impl OutputHandler for CollectingOutput {
    fn on_result(&mut self, result: &ProbeResult) -> OutputResult<()> {
        self.results.push(result.clone());
        Ok(())
    }

    fn on_finish(&mut self, report: &RunReport) -> OutputResult<()> {
        self.report = Some(report.clone());
        Ok(())
    }
}
