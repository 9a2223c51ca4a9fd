//! Dispatch metrics.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by method, outcome, status
//! - `router_dispatch_duration_seconds` (histogram): dispatch latency by
//!   method and outcome
//! - `router_handler_errors_total` (counter): errors raised by handlers and
//!   filters, by error type
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; a no-op until the embedder
//!   installs a recorder
//! - Labels stay low-cardinality: no paths, only route outcomes

use std::time::Instant;

use crate::http::method::HttpMethod;

/// Record one completed dispatch.
pub fn record_dispatch(method: HttpMethod, outcome: &'static str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();

    ::metrics::counter!(
        "router_requests_total",
        "method" => method.as_str(),
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);

    ::metrics::histogram!(
        "router_dispatch_duration_seconds",
        "method" => method.as_str(),
        "outcome" => outcome
    )
    .record(elapsed);
}

/// Record an error raised by a handler or filter.
pub fn record_handler_error(error_type: &'static str) {
    ::metrics::counter!("router_handler_errors_total", "error_type" => error_type).increment(1);
}
