//! Probe module for batch HTTP probing
//!
//! This module contains the core probing logic, including:
//! - Outcome classification of responses and transport failures
//! - The concurrency limiter bounding in-flight requests
//! - The worker that executes one GET per URL
//! - Batch coordination

mod coordinator;
mod limiter;
mod outcome;
mod worker;

pub use coordinator::{probe_all, Coordinator};
pub use limiter::{ConcurrencyLimiter, ProbePermit};
pub use outcome::{
    cause_chain, classify_error, root_cause, FailureCategory, Outcome, MAX_CAUSE_DEPTH,
};
pub use worker::{build_http_client, ProbeResult, Prober};
