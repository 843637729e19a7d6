//! Per-request trace events.

use std::time::Duration;

use tracing::debug;

use crate::response::Response;

/// Emits one `debug` event for a completed request.
pub fn record(method: &http::Method, path: &str, response: &Response, latency: Duration) {
    debug!(
        %method,
        path,
        status = response.status_code(),
        latency_us = latency.as_micros() as u64,
        "request"
    );
}
