//! Logging setup and in-process counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter. Calling this more than once
/// is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Counters for cache effectiveness and preload outcomes
#[derive(Debug, Default)]
pub struct Metrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    backend_requests: AtomicU64,
    backend_failures: AtomicU64,
    preload_loaded: AtomicU64,
    preload_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "cache_hits", "Metric incremented");
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "cache_misses", "Metric incremented");
    }

    pub fn backend_request(&self) {
        self.backend_requests.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "backend_requests", "Metric incremented");
    }

    pub fn backend_failure(&self) {
        self.backend_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "backend_failures", "Metric incremented");
    }

    pub fn preload_loaded(&self) {
        self.preload_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn preload_failed(&self) {
        self.preload_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            backend_requests: self.backend_requests.load(Ordering::Relaxed),
            backend_failures: self.backend_failures.load(Ordering::Relaxed),
            preload_loaded: self.preload_loaded.load(Ordering::Relaxed),
            preload_failed: self.preload_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub backend_requests: u64,
    pub backend_failures: u64,
    pub preload_loaded: u64,
    pub preload_failed: u64,
}
