//! Prometheus metrics for the distributor.
//!
//! [`DistributorMetrics`] owns a dedicated [`Registry`] that the RPC
//! `/metrics` endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

/// Central collection of all distributor metrics.
pub struct DistributorMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Work requests that reached the orchestrator.
    pub requests: IntCounter,
    /// Requests answered from the cache without contacting any node.
    pub cache_hits: IntCounter,
    /// Backend replies whose work passed validation.
    pub work_accepted: IntCounter,
    /// Well-formed backend replies whose work failed validation.
    pub work_rejected: IntCounter,
    /// Backend calls that failed in transport or returned an unusable reply.
    pub node_failures: IntCounter,
    /// Fan-out rounds in which every node failed.
    pub attempts_failed: IntCounter,
    /// Requests that exhausted every attempt.
    pub requests_failed: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Current number of cached results.
    pub cache_entries: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time from the first fan-out to a winner, in milliseconds.
    pub race_latency_ms: Histogram,
}

impl DistributorMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests = register_int_counter_with_registry!(
            Opts::new("powdist_requests_total", "Work requests received"),
            registry
        )
        .expect("failed to register requests counter");

        let cache_hits = register_int_counter_with_registry!(
            Opts::new("powdist_cache_hits_total", "Work requests served from cache"),
            registry
        )
        .expect("failed to register cache_hits counter");

        let work_accepted = register_int_counter_with_registry!(
            Opts::new(
                "powdist_work_accepted_total",
                "Backend replies with valid work"
            ),
            registry
        )
        .expect("failed to register work_accepted counter");

        let work_rejected = register_int_counter_with_registry!(
            Opts::new(
                "powdist_work_rejected_total",
                "Backend replies whose work failed validation"
            ),
            registry
        )
        .expect("failed to register work_rejected counter");

        let node_failures = register_int_counter_with_registry!(
            Opts::new(
                "powdist_node_failures_total",
                "Backend calls that failed or returned an unusable reply"
            ),
            registry
        )
        .expect("failed to register node_failures counter");

        let attempts_failed = register_int_counter_with_registry!(
            Opts::new(
                "powdist_attempts_failed_total",
                "Fan-out rounds in which every node failed"
            ),
            registry
        )
        .expect("failed to register attempts_failed counter");

        let requests_failed = register_int_counter_with_registry!(
            Opts::new(
                "powdist_requests_failed_total",
                "Work requests that exhausted every attempt"
            ),
            registry
        )
        .expect("failed to register requests_failed counter");

        let cache_entries = register_int_gauge_with_registry!(
            Opts::new("powdist_cache_entries", "Current number of cached results"),
            registry
        )
        .expect("failed to register cache_entries gauge");

        // 1 ms → ~16 s.
        let race_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "powdist_race_latency_ms",
                "Time to obtain valid work from the backends in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 15).expect("valid buckets")),
            registry
        )
        .expect("failed to register race_latency_ms histogram");

        Self {
            registry,
            requests,
            cache_hits,
            work_accepted,
            work_rejected,
            node_failures,
            attempts_failed,
            requests_failed,
            cache_entries,
            race_latency_ms,
        }
    }

    /// Encode every metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for DistributorMetrics {
    fn default() -> Self {
        Self::new()
    }
}
