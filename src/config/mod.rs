//! Configuration module for Ripple-Probe
//!
//! Settings are layered from built-in defaults, an optional TOML file, the
//! process environment (`CONCURRENCY`, `REQUEST_TIMEOUT`, `USER_AGENT`,
//! `LIMIT`, `FORMAT`) and finally command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use ripple_probe::config::{load_layered, ConfigOverrides};
//!
//! let config = load_layered(None, &ConfigOverrides::default()).unwrap();
//! println!("Probing with concurrency {}", config.probe.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, LineFormat, OutputSettings, ProbeSettings, SummaryFormat};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, load_layered, ConfigOverrides, ENV_CONCURRENCY, ENV_FORMAT,
    ENV_LIMIT, ENV_REQUEST_TIMEOUT, ENV_USER_AGENT,
};
pub use validation::{validate, MAX_CONCURRENCY};
