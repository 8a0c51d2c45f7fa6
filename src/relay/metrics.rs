//! Performance metrics for relay request handling
//!
//! Tracks request counts, outcomes, and latency per endpoint so the relay
//! can be observed under load.
//!
//! # Metrics
//!
//! - `relay_requests_total`: Counter of requests received
//! - `relay_responses_total`: Counter of responses by outcome
//! - `relay_request_duration_seconds`: Histogram of request latency
//! - `relay_active_requests`: Gauge of requests currently in flight

use metrics::{decrement_gauge, histogram, increment_counter, increment_gauge};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Metrics collection for a single relay request
///
/// Created when a request enters a handler and recorded exactly once with
/// the outcome. The active-request gauge is decremented on drop when no
/// outcome was recorded, keeping the gauge accurate across panics.
///
/// The recorded flag uses an atomic so the tracker can live across await
/// points inside handler futures.
#[derive(Debug)]
pub struct RequestMetrics {
    /// Endpoint label ("chat" or "image")
    endpoint: &'static str,

    /// When the request entered the handler
    start: Instant,

    /// Whether an outcome has been recorded
    recorded: AtomicBool,
}

impl RequestMetrics {
    /// Start tracking a request against the given endpoint
    ///
    /// Increments the request counter and the active-request gauge.
    pub fn start(endpoint: &'static str) -> Self {
        increment_counter!("relay_requests_total", "endpoint" => endpoint);
        increment_gauge!("relay_active_requests", 1.0, "endpoint" => endpoint);

        Self {
            endpoint,
            start: Instant::now(),
            recorded: AtomicBool::new(false),
        }
    }

    /// Record a successful response
    pub fn record_success(&self) {
        self.record_outcome("success");
    }

    /// Record a failed response with its outcome label
    ///
    /// # Arguments
    ///
    /// * `outcome` - Failure class ("invalid_request", "config_error",
    ///   "upstream_error")
    pub fn record_failure(&self, outcome: &'static str) {
        self.record_outcome(outcome);
    }

    fn record_outcome(&self, outcome: &'static str) {
        if self.recorded.swap(true, Ordering::SeqCst) {
            return;
        }

        let duration = self.start.elapsed();

        histogram!(
            "relay_request_duration_seconds",
            duration.as_secs_f64(),
            "endpoint" => self.endpoint,
            "outcome" => outcome
        );

        increment_counter!(
            "relay_responses_total",
            "endpoint" => self.endpoint,
            "outcome" => outcome
        );

        decrement_gauge!("relay_active_requests", 1.0, "endpoint" => self.endpoint);
    }

    /// Returns the endpoint label
    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    /// Returns elapsed time since the request was accepted
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for RequestMetrics {
    /// Ensures cleanup on drop - decrements the active gauge even when no
    /// outcome was recorded.
    fn drop(&mut self) {
        if !self.recorded.load(Ordering::SeqCst) {
            decrement_gauge!("relay_active_requests", 1.0, "endpoint" => self.endpoint);
        }
    }
}

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this function sets up the
/// Prometheus metrics exporter to expose metrics on the standard
/// Prometheus endpoint. When disabled, it's a no-op and still safe to
/// call.
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
