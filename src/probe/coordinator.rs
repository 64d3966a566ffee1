//! Probe coordinator - batch orchestration
//!
//! Spawns one task per URL, all gated by the shared limiter, and streams
//! each result into the [`Aggregator`] and the output handler as it lands.
//! Returns once every task has finished.

use crate::config::Config;
use crate::output::{Aggregator, OutputHandler, RunReport};
use crate::probe::limiter::ConcurrencyLimiter;
use crate::probe::worker::{ProbeResult, Prober};
use crate::ProbeError;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Main coordinator structure
pub struct Coordinator {
    prober: Arc<Prober>,
}

impl Coordinator {
    /// Creates a coordinator with a client and limiter built from `config`
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ProbeError> {
        let prober = Prober::from_settings(&config.probe)?;
        Ok(Self::with_prober(prober))
    }

    /// Creates a coordinator around an existing prober
    pub fn with_prober(prober: Prober) -> Self {
        Self {
            prober: Arc::new(prober),
        }
    }

    /// The prober shared by all tasks
    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    /// Returns a handle that stops the batch from outside the driver
    ///
    /// Closing the returned limiter makes every probe still waiting for a
    /// permit end as `CancelledError`; probes already in flight complete
    /// normally and the batch still produces a full report.
    pub fn cancel_handle(&self) -> ConcurrencyLimiter {
        self.prober.limiter().clone()
    }

    /// Probes every URL from `urls` and returns the run report
    ///
    /// All tasks are started as URLs are read; the limiter keeps only the
    /// ceiling in flight. Results are recorded in completion order.
    ///
    /// # Arguments
    ///
    /// * `urls` - URL lines in source order; the first `Err` aborts the batch
    /// * `handler` - Receives each result as soon as its probe completes
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - Summary, wall-clock time and peak concurrency
    /// * `Err(ProbeError)` - See below
    ///
    /// # Errors
    ///
    /// * [`ProbeError::Source`] - reading the URL source failed; tasks already
    ///   started are aborted
    /// * [`ProbeError::EmptySource`] - the source produced no URLs
    /// * [`ProbeError::Output`] - the output handler failed
    pub async fn run<I, H>(&self, urls: I, handler: &mut H) -> Result<RunReport, ProbeError>
    where
        I: IntoIterator<Item = io::Result<String>>,
        H: OutputHandler + ?Sized,
    {
        let start_time = Instant::now();
        let mut tasks: JoinSet<ProbeResult> = JoinSet::new();
        let mut submitted = 0usize;

        for url in urls {
            let url = url.map_err(ProbeError::Source)?;
            let prober = Arc::clone(&self.prober);
            tasks.spawn(async move { prober.probe(url).await });
            submitted += 1;
        }

        if submitted == 0 {
            return Err(ProbeError::EmptySource);
        }

        tracing::info!(
            "Submitted {} URLs (concurrency ceiling {})",
            submitted,
            self.prober.limiter().ceiling()
        );

        let mut aggregator = Aggregator::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    handler.on_result(&result)?;
                    aggregator.record(&result);

                    let done = aggregator.len();
                    if done % 100 == 0 {
                        tracing::info!("Progress: {}/{} probes complete", done, submitted);
                    }
                }
                Err(e) => {
                    tracing::error!("Probe task failed: {}", e);
                }
            }
        }

        let elapsed = start_time.elapsed();
        tracing::info!(
            "Probed {} URLs in {:?} (peak concurrency {})",
            aggregator.len(),
            elapsed,
            self.prober.limiter().peak()
        );

        Ok(RunReport {
            summary: aggregator.summarize(),
            elapsed,
            peak_concurrency: self.prober.limiter().peak(),
        })
    }
}

/// Runs a complete batch
///
/// Probes `urls` through `coordinator` and hands the final report to
/// `handler`.
pub async fn probe_all<I, H>(
    coordinator: &Coordinator,
    urls: I,
    handler: &mut H,
) -> Result<RunReport, ProbeError>
where
    I: IntoIterator<Item = io::Result<String>>,
    H: OutputHandler + ?Sized,
{
    let report = coordinator.run(urls, handler).await?;
    handler.on_finish(&report)?;
    Ok(report)
}
