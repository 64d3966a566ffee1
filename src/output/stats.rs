//! Result aggregation
//!
//! The [`Aggregator`] is fed one [`ProbeResult`] at a time and keeps the
//! per-outcome counts and every latency; [`Aggregator::summarize`] reduces
//! them once the batch is done.

use crate::probe::{Outcome, ProbeResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Counts of outcomes by status class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusClassCounts {
    #[serde(rename = "1xx")]
    pub informational: u64,
    #[serde(rename = "2xx")]
    pub success: u64,
    #[serde(rename = "3xx")]
    pub redirection: u64,
    #[serde(rename = "4xx")]
    pub client_error: u64,
    #[serde(rename = "5xx")]
    pub server_error: u64,
    /// Every failure category, plus status codes outside 100..=599
    #[serde(rename = "Exception")]
    pub exception: u64,
}

impl StatusClassCounts {
    fn record(&mut self, outcome: &Outcome) {
        let slot = match outcome.status() {
            Some(100..=199) => &mut self.informational,
            Some(200..=299) => &mut self.success,
            Some(300..=399) => &mut self.redirection,
            Some(400..=499) => &mut self.client_error,
            Some(500..=599) => &mut self.server_error,
            _ => &mut self.exception,
        };
        *slot += 1;
    }
}

/// Incremental accumulator of probe results
#[derive(Debug, Default)]
pub struct Aggregator {
    counts: HashMap<Outcome, u64>,
    latencies: Vec<Duration>,
    classes: StatusClassCounts,
    ok_body_bytes: u64,
    first_start: Option<DateTime<Utc>>,
    last_end: Option<DateTime<Utc>>,
}

/// Final statistics of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Number of recorded results
    pub total: u64,

    /// Count per outcome
    pub counts: HashMap<Outcome, u64>,

    /// Counts per status class
    pub classes: StatusClassCounts,

    /// Arithmetic mean of all latencies
    pub average: Duration,

    /// Element at index `len / 2` of the ascending latencies
    ///
    /// For an even count this is the upper of the two middle elements; the
    /// two are never averaged.
    pub median: Duration,

    /// Largest latency
    pub max: Duration,

    /// Total body bytes of 2xx responses
    pub ok_body_bytes: u64,

    /// From the earliest probe start to the latest probe end
    pub window: Duration,
}

impl Aggregator {
    /// Creates an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one result
    pub fn record(&mut self, result: &ProbeResult) {
        *self.counts.entry(result.outcome.clone()).or_insert(0) += 1;
        self.latencies.push(result.duration);
        self.classes.record(&result.outcome);

        if result.outcome.is_success() {
            self.ok_body_bytes += result.response_size.unwrap_or(0);
        }

        let end = chrono::Duration::from_std(result.duration)
            .ok()
            .and_then(|d| result.started_at.checked_add_signed(d))
            .unwrap_or(result.started_at);

        self.first_start = Some(match self.first_start {
            Some(t) if t <= result.started_at => t,
            _ => result.started_at,
        });
        self.last_end = Some(match self.last_end {
            Some(t) if t >= end => t,
            _ => end,
        });
    }

    /// Number of recorded results
    pub fn len(&self) -> usize {
        self.latencies.len()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.latencies.is_empty()
    }

    /// Count recorded so far for `outcome`
    pub fn count(&self, outcome: &Outcome) -> u64 {
        self.counts.get(outcome).copied().unwrap_or(0)
    }

    /// Reduces the recorded results
    ///
    /// Returns `None` when nothing was recorded, since average and median
    /// are undefined for an empty set.
    pub fn summarize(&self) -> Option<Summary> {
        if self.latencies.is_empty() {
            return None;
        }

        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();

        let n = sorted.len();
        let total_nanos: u128 = sorted.iter().map(Duration::as_nanos).sum();
        let average = nanos_to_duration(total_nanos / n as u128);
        let median = sorted[n / 2];
        let max = sorted[n - 1];

        let window = match (self.first_start, self.last_end) {
            (Some(start), Some(end)) => (end - start).to_std().unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        };

        Some(Summary {
            total: self.counts.values().sum(),
            counts: self.counts.clone(),
            classes: self.classes,
            average,
            median,
            max,
            ok_body_bytes: self.ok_body_bytes,
            window,
        })
    }
}

impl Summary {
    /// Outcomes sorted by descending count, ties broken by name
    pub fn sorted_counts(&self) -> Vec<(&Outcome, u64)> {
        let mut counts: Vec<_> = self.counts.iter().map(|(o, c)| (o, *c)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.to_string().cmp(&b.0.to_string())));
        counts
    }

    /// Fraction of results with a 2xx status
    pub fn ok_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.classes.success as f64 / self.total as f64
    }

    /// 2xx responses per second over `elapsed`
    pub fn ok_per_second(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.classes.success as f64 / secs
    }

    /// Average body length of 2xx responses
    pub fn average_ok_body_length(&self) -> Option<u64> {
        if self.classes.success == 0 {
            return None;
        }
        Some(self.ok_body_bytes / self.classes.success)
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = (nanos / 1_000_000_000) as u64;
    let sub = (nanos % 1_000_000_000) as u32;
    Duration::new(secs, sub)
}

/// Converts a duration to fractional milliseconds
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
