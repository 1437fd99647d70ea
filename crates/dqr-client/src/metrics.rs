//! QR code API metrics.
//!
//! - Request counters by operation and outcome
//! - Latency histograms

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

pub mod names {
    /// Total API requests by operation and outcome.
    pub const REQUESTS_TOTAL: &str = "dowell_qr_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "dowell_qr_latency_seconds";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record metrics for a completed API call.
///
/// `outcome` is `"ok"` or the error kind label.
pub fn record_request(operation: &str, outcome: &str, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}
