//! Prometheus counters for the health endpoint and backend probe.

use metrics::{counter, describe_counter};

// === Metric Name Constants ===

/// Health requests counter metric name.
pub const METRIC_HEALTH_REQUESTS: &str = "health_requests_total";
/// Preflight requests counter metric name.
pub const METRIC_PREFLIGHT_REQUESTS: &str = "preflight_requests_total";
/// Denied origins counter metric name.
pub const METRIC_ORIGINS_DENIED: &str = "origins_denied_total";
/// Health payload failures counter metric name.
pub const METRIC_HEALTH_FAILURES: &str = "health_failures_total";
/// Backend probe attempts counter metric name.
pub const METRIC_PROBE_ATTEMPTS: &str = "backend_probe_attempts_total";
/// Backend probe failures counter metric name.
pub const METRIC_PROBE_FAILURES: &str = "backend_probe_failures_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_HEALTH_REQUESTS, "Total number of health requests served");
    describe_counter!(METRIC_PREFLIGHT_REQUESTS, "Total number of preflight requests short-circuited");
    describe_counter!(METRIC_ORIGINS_DENIED, "Total number of requests with a denied origin");
    describe_counter!(METRIC_HEALTH_FAILURES, "Total number of health payload assembly failures");
    describe_counter!(METRIC_PROBE_ATTEMPTS, "Total number of backend probe attempts");
    describe_counter!(METRIC_PROBE_FAILURES, "Total number of failed backend probe attempts");
}

/// Increment the health request counter.
pub fn inc_health_requests() {
    counter!(METRIC_HEALTH_REQUESTS).increment(1);
}

/// Increment the preflight counter.
pub fn inc_preflight_requests() {
    counter!(METRIC_PREFLIGHT_REQUESTS).increment(1);
}

/// Increment the denied-origin counter.
pub fn inc_origins_denied() {
    counter!(METRIC_ORIGINS_DENIED).increment(1);
}

/// Increment the payload failure counter.
pub fn inc_health_failures() {
    counter!(METRIC_HEALTH_FAILURES).increment(1);
}

/// Increment the probe attempt counter.
pub fn inc_probe_attempts() {
    counter!(METRIC_PROBE_ATTEMPTS).increment(1);
}

/// Increment the probe failure counter.
pub fn inc_probe_failures() {
    counter!(METRIC_PROBE_FAILURES).increment(1);
}
