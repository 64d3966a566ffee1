use crate::config::types::{Config, LineFormat, SummaryFormat};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use std::str::FromStr;

/// Environment variable holding the concurrency ceiling
pub const ENV_CONCURRENCY: &str = "CONCURRENCY";
/// Environment variable holding the per-request deadline in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";
/// Environment variable holding the User-Agent header value
pub const ENV_USER_AGENT: &str = "USER_AGENT";
/// Environment variable holding the cap on the URL source length
pub const ENV_LIMIT: &str = "LIMIT";
/// Environment variable selecting the output format
pub const ENV_FORMAT: &str = "FORMAT";

/// Loads and parses a configuration file from the given path
///
/// Keys missing from the file keep their defaults. The result is not
/// validated here because environment and command-line overrides are
/// usually layered on top; call [`validate`] once layering is done.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use ripple_probe::config::load_config;
///
/// let config = load_config(Path::new("probe.toml")).unwrap();
/// println!("Concurrency: {}", config.probe.concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Overlays values found through `lookup` onto `config`
///
/// `lookup` is normally [`std::env::var`]; tests pass a closure over a map.
/// Values that fail to parse are ignored and the previous value is kept.
///
/// `FORMAT` accepts a line format (`csv`, `human`, `none`), a summary format
/// (`text`, `json`), or `result`, which selects the JSON summary and
/// suppresses per-request lines so the output is a single JSON document.
///
/// # Arguments
///
/// * `config` - Configuration to update in place
/// * `lookup` - Returns the raw value of a variable, or `None` if unset
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = parse_var(&lookup, ENV_CONCURRENCY) {
        config.probe.concurrency = v;
    }
    if let Some(v) = parse_var(&lookup, ENV_REQUEST_TIMEOUT) {
        config.probe.request_timeout = v;
    }
    if let Some(v) = parse_var(&lookup, ENV_LIMIT) {
        config.probe.limit = v;
    }
    if let Some(v) = lookup(ENV_USER_AGENT) {
        config.probe.user_agent = v;
    }

    if let Some(format) = lookup(ENV_FORMAT) {
        if format.trim().eq_ignore_ascii_case("result") {
            config.output.line_format = LineFormat::None;
            config.output.summary_format = SummaryFormat::Json;
        } else if let Ok(line) = LineFormat::from_str(&format) {
            config.output.line_format = line;
        } else if let Ok(summary) = SummaryFormat::from_str(&format) {
            config.output.summary_format = summary;
        } else {
            tracing::warn!("Ignoring unknown {}={:?}", ENV_FORMAT, format);
        }
    }
}

/// Explicit values that take precedence over file and environment,
/// normally taken from command-line flags
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub concurrency: Option<u32>,
    pub request_timeout: Option<u64>,
    pub user_agent: Option<String>,
    pub limit: Option<usize>,
    pub line_format: Option<LineFormat>,
    pub summary_format: Option<SummaryFormat>,
}

impl ConfigOverrides {
    /// Writes every value that is set onto `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(v) = self.concurrency {
            config.probe.concurrency = v;
        }
        if let Some(v) = self.request_timeout {
            config.probe.request_timeout = v;
        }
        if let Some(v) = &self.user_agent {
            config.probe.user_agent = v.clone();
        }
        if let Some(v) = self.limit {
            config.probe.limit = v;
        }
        if let Some(v) = self.line_format {
            config.output.line_format = v;
        }
        if let Some(v) = self.summary_format {
            config.output.summary_format = v;
        }
    }
}

/// Builds the effective configuration and validates it
///
/// Layers, lowest precedence first: built-in defaults, the TOML file at
/// `path`, the process environment, then `overrides`.
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
/// * `overrides` - Values that win over every other layer
///
/// # Returns
///
/// * `Ok(Config)` - The layered and validated configuration
/// * `Err(ConfigError)` - The file could not be read or parsed, or the
///   final values are out of range
pub fn load_layered(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    layer(path, |key| std::env::var(key).ok(), overrides)
}

fn layer<F>(
    path: Option<&Path>,
    lookup: F,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => {
            tracing::info!("Loading configuration from: {}", p.display());
            load_config(p)?
        }
        None => Config::default(),
    };
    apply_env_overrides(&mut config, lookup);
    overrides.apply(&mut config);
    validate(&config)?;
    Ok(config)
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
