//! Output module for per-request lines and run summaries
//!
//! This module handles:
//! - Aggregating probe results into summary statistics
//! - Formatting one line per completed probe
//! - Printing the final summary as text or JSON

mod console;
mod line;
pub mod stats;
mod traits;

pub use console::{write_text_summary, ConsoleOutput, SummaryDocument};
pub use line::format_line;
pub use stats::{Aggregator, StatusClassCounts, Summary};
pub use traits::{CollectingOutput, OutputError, OutputHandler, OutputResult, RunReport};
