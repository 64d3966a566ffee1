//! Ripple-Probe: a bounded-concurrency batch HTTP prober
//!
//! This crate probes a list of URLs with one HTTP GET each, keeps at most a
//! configured number of requests in flight, classifies every outcome as a
//! status code or a failure category, and aggregates latency statistics.

pub mod config;
pub mod output;
pub mod probe;
pub mod source;

use thiserror::Error;

/// Main error type for Ripple-Probe operations
///
/// Per-probe transport failures never show up here; they are recorded as
/// [`probe::Outcome::Failure`] values instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read URL source: {0}")]
    Source(#[source] std::io::Error),

    #[error("URL source is empty")]
    EmptySource,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Ripple-Probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{Aggregator, Summary};
pub use probe::{FailureCategory, Outcome, ProbeResult, Prober};
pub use source::UrlSource;
