//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTable::build / dispatch
//!     → tracing spans and events (request_id, method, path, outcome)
//!     → logging.rs subscriber (pretty or JSON to stdout)
//!     → metrics.rs counters and histograms (recorder chosen by embedder)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every event of a dispatch via its span
//! - Metrics go through the `metrics` facade; no exporter is installed here
//! - Logging setup is explicit: the library never installs a subscriber

pub mod logging;
pub mod metrics;
