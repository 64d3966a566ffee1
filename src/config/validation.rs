use crate::config::types::{Config, ProbeSettings};
use crate::ConfigError;
use reqwest::header::HeaderValue;

/// Upper bound on the concurrency ceiling
pub const MAX_CONCURRENCY: u32 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_probe_settings(&config.probe)?;
    Ok(())
}

/// Validates probe settings
fn validate_probe_settings(settings: &ProbeSettings) -> Result<(), ConfigError> {
    if settings.concurrency < 1 || settings.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, settings.concurrency
        )));
    }

    if settings.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            settings.request_timeout
        )));
    }

    if settings.limit < 1 {
        return Err(ConfigError::Validation(format!(
            "limit must be >= 1, got {}",
            settings.limit
        )));
    }

    validate_user_agent(&settings.user_agent)?;

    Ok(())
}

/// Validates that the user agent can be sent as a header value
fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    HeaderValue::from_str(user_agent).map_err(|_| {
        ConfigError::Validation(format!(
            "user_agent is not a valid header value: {:?}",
            user_agent
        ))
    })?;

    Ok(())
}
