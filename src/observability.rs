//! Tracing setup and in-process job counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

use crate::pipeline::Outcome;

/// Install the global fmt subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Metrics handle for recording job counters
#[derive(Debug, Default)]
pub struct Metrics {
    jobs_started: AtomicU64,
    jobs_succeeded: AtomicU64,
    jobs_failed_no_audio: AtomicU64,
    jobs_failed_delivery: AtomicU64,
    fetch_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_started(&self) {
        self.jobs_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_started", "Metric incremented");
    }

    pub fn job_finished(&self, outcome: Outcome) {
        let (counter, name) = match outcome {
            Outcome::Succeeded => (&self.jobs_succeeded, "jobs_succeeded"),
            Outcome::FailedNoAudio => (&self.jobs_failed_no_audio, "jobs_failed_no_audio"),
            Outcome::FailedDelivery => (&self.jobs_failed_delivery, "jobs_failed_delivery"),
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = name, "Metric incremented");
    }

    pub fn fetches_failed(&self, count: u64) {
        if count > 0 {
            self.fetch_failures.fetch_add(count, Ordering::Relaxed);
            tracing::debug!(counter = "fetch_failures", count, "Metric incremented");
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_started: self.jobs_started.load(Ordering::Relaxed),
            jobs_succeeded: self.jobs_succeeded.load(Ordering::Relaxed),
            jobs_failed_no_audio: self.jobs_failed_no_audio.load(Ordering::Relaxed),
            jobs_failed_delivery: self.jobs_failed_delivery.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub jobs_started: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed_no_audio: u64,
    pub jobs_failed_delivery: u64,
    pub fetch_failures: u64,
}
