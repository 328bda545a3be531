//! Storage metrics collection.
//!
//! Provides standardized metrics for monitoring B2 operations:
//! - Request counters by operation and status
//! - Latency histograms
//! - Re-authorization counters

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total B2 requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "vidhost_b2_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "vidhost_b2_latency_seconds";

    /// Session or upload-target refreshes after an expired token.
    pub const REAUTH_TOTAL: &str = "vidhost_b2_reauth_total";

    /// Bytes accepted by the upload endpoint.
    pub const UPLOADED_BYTES_TOTAL: &str = "vidhost_b2_uploaded_bytes_total";

    /// Listings that degraded to an empty result.
    pub const LISTING_FAILURES_TOTAL: &str = "vidhost_listing_failures_total";
}

/// Record metrics for a completed B2 request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a refresh triggered by an expired token.
pub fn record_reauth(operation: &str) {
    counter!(names::REAUTH_TOTAL, "operation" => operation.to_string()).increment(1);
}

pub fn record_uploaded_bytes(bytes: u64) {
    counter!(names::UPLOADED_BYTES_TOTAL).increment(bytes);
}

/// Record a listing that failed open.
pub fn record_listing_failure(kind: &str) {
    counter!(names::LISTING_FAILURES_TOTAL, "kind" => kind.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("b2_list_buckets", 200, 12.0);
        record_reauth("b2_get_upload_url");
        record_uploaded_bytes(1024);
        record_listing_failure("network");
    }

    #[test]
    fn test_metric_names_are_prefixed() {
        for name in [
            names::REQUESTS_TOTAL,
            names::LATENCY_SECONDS,
            names::REAUTH_TOTAL,
            names::UPLOADED_BYTES_TOTAL,
        ] {
            assert!(name.starts_with("vidhost_b2_"));
        }
    }
}
