//! Concurrency limiter
//!
//! A counting gate over a tokio [`Semaphore`]. Callers hold a
//! [`ProbePermit`] for the whole network call; dropping the permit releases
//! it on every exit path, including early returns and panics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Caps the number of probes in flight
///
/// Cloning is cheap and every clone shares the same permits.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    counters: Arc<Counters>,
    ceiling: usize,
}

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// A held concurrency token, released on drop
#[derive(Debug)]
pub struct ProbePermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl ConcurrencyLimiter {
    /// Creates a limiter allowing at most `ceiling` permits at once
    ///
    /// A ceiling of zero is raised to one so acquisition can never deadlock.
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(ceiling)),
            counters: Arc::new(Counters::default()),
            ceiling,
        }
    }

    /// Waits until fewer than `ceiling` permits are held, then takes one
    ///
    /// Waiters are woken in FIFO order, which tokio's semaphore provides.
    ///
    /// # Errors
    ///
    /// Fails only if the limiter has been closed.
    pub async fn acquire(&self) -> Result<ProbePermit, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);

        Ok(ProbePermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        })
    }

    /// Stops handing out permits; pending and future `acquire` calls fail
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// The configured ceiling
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Number of permits currently held
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits ever held at the same time
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }
}

impl Drop for ProbePermit {
    fn drop(&mut self) {
        // Counter goes down before the semaphore permit (a field) is returned
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
