//! Probe worker
//!
//! This module handles the HTTP side of a probe:
//! - Building the shared HTTP client with the configured user agent
//! - Holding a concurrency permit for the whole request
//! - Sending one GET and reading the full body
//! - Turning every failure into a classified outcome

use crate::config::ProbeSettings;
use crate::probe::limiter::ConcurrencyLimiter;
use crate::probe::outcome::{classify_error, FailureCategory, Outcome};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Result of a single probe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// The URL as it came from the source
    pub url: String,

    /// Status code or failure category
    pub outcome: Outcome,

    /// Wall-clock time at which the request started
    pub started_at: DateTime<Utc>,

    /// Time from the start of the request to the known outcome
    pub duration: Duration,

    /// Length of the response body, when it was read completely
    pub response_size: Option<u64>,
}

/// Builds the HTTP client shared by every probe
///
/// The client carries the user agent header and the per-request deadline,
/// and keeps up to `concurrency` idle connections per host.
///
/// # Example
///
/// ```no_run
/// use ripple_probe::config::ProbeSettings;
/// use ripple_probe::probe::build_http_client;
///
/// let client = build_http_client(&ProbeSettings::default()).unwrap();
/// ```
pub fn build_http_client(settings: &ProbeSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.request_timeout))
        .pool_max_idle_per_host(settings.concurrency as usize)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Executes probes through a shared client, gated by a shared limiter
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    limiter: ConcurrencyLimiter,
}

impl Prober {
    /// Creates a prober from explicit parts
    pub fn new(client: Client, limiter: ConcurrencyLimiter) -> Self {
        Self { client, limiter }
    }

    /// Creates a prober with a client and limiter built from `settings`
    pub fn from_settings(settings: &ProbeSettings) -> Result<Self, reqwest::Error> {
        let client = build_http_client(settings)?;
        let limiter = ConcurrencyLimiter::new(settings.concurrency as usize);
        Ok(Self::new(client, limiter))
    }

    /// The limiter gating this prober
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Probes one URL
    ///
    /// Waits for a concurrency permit, then starts the clock, sends a GET
    /// and reads the whole body. The permit is released before returning.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute http or https URL
    ///
    /// # Returns
    ///
    /// A [`ProbeResult`] in every case. Transport errors, a body that cannot
    /// be read and a closed limiter all become [`Outcome::Failure`] with no
    /// response size.
    pub async fn probe(&self, url: String) -> ProbeResult {
        let permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::debug!("No permit for {}, limiter closed", url);
                return ProbeResult {
                    url,
                    outcome: Outcome::Failure(FailureCategory::Cancelled),
                    started_at: Utc::now(),
                    duration: Duration::ZERO,
                    response_size: None,
                };
            }
        };

        let started_at = Utc::now();
        let start = Instant::now();
        let (outcome, response_size) = self.execute(&url).await;
        let duration = start.elapsed();
        drop(permit);

        match &outcome {
            Outcome::Status(code) => {
                tracing::debug!("{} -> {} in {:?}", url, code, duration)
            }
            Outcome::Failure(category) => {
                tracing::debug!("{} failed ({}) after {:?}", url, category, duration)
            }
        }

        ProbeResult {
            url,
            outcome,
            started_at,
            duration,
            response_size,
        }
    }

    async fn execute(&self, url: &str) -> (Outcome, Option<u64>) {
        let parsed = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            Ok(parsed) => {
                tracing::debug!("Unsupported scheme {:?} in {}", parsed.scheme(), url);
                return (Outcome::Failure(FailureCategory::InvalidUrl), None);
            }
            Err(e) => return (Outcome::Failure(classify_error(&e)), None),
        };

        let response = match self.client.get(parsed).send().await {
            Ok(response) => response,
            Err(e) => return (Outcome::Failure(classify_error(&e)), None),
        };

        let status = response.status().as_u16();

        match response.bytes().await {
            Ok(body) => (Outcome::Status(status), Some(body.len() as u64)),
            Err(e) => (Outcome::Failure(classify_error(&e)), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&ProbeSettings::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_never_hits_network() {
        let prober = Prober::from_settings(&ProbeSettings::default()).unwrap();
        let result = prober.probe("not a url".to_string()).await;

        assert_eq!(result.outcome, Outcome::Failure(FailureCategory::InvalidUrl));
        assert_eq!(result.response_size, None);
        assert_eq!(prober.limiter().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let prober = Prober::from_settings(&ProbeSettings::default()).unwrap();
        let result = prober.probe("ftp://example.com/file".to_string()).await;

        assert_eq!(result.outcome, Outcome::Failure(FailureCategory::InvalidUrl));
    }

    #[tokio::test]
    async fn test_closed_limiter_yields_cancelled() {
        let prober = Prober::from_settings(&ProbeSettings::default()).unwrap();
        prober.limiter().close();
        let result = prober.probe("http://127.0.0.1:1/".to_string()).await;

        assert_eq!(result.outcome, Outcome::Failure(FailureCategory::Cancelled));
        assert_eq!(result.duration, Duration::ZERO);
    }
}
