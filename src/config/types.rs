use serde::Deserialize;

/// Main configuration structure for Ripple-Probe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Probe behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Maximum number of probes in flight at once
    pub concurrency: u32,

    /// Per-request deadline (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Value sent in the User-Agent header
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Maximum number of URLs taken from the source
    pub limit: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            concurrency: 10,
            request_timeout: 5,
            user_agent: format!("ripple-probe/{}", env!("CARGO_PKG_VERSION")),
            limit: 1000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Format of the per-request lines
    #[serde(rename = "line-format")]
    pub line_format: LineFormat,

    /// Format of the final summary
    #[serde(rename = "summary-format")]
    pub summary_format: SummaryFormat,
}

/// Per-request line layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    /// `<url>,<outcome>,<start>,<duration_ms>,<body_length>`
    #[default]
    Csv,

    /// `<url> - <outcome> - <seconds>s`
    Human,

    /// No per-request lines
    None,
}

/// Final summary layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LineFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "human" => Ok(Self::Human),
            "none" => Ok(Self::None),
            other => Err(format!("unknown line format '{}'", other)),
        }
    }
}

impl std::str::FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown summary format '{}'", other)),
        }
    }
}
