//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     builder.rs (routes, filters, exception handlers)
//!     → pattern.rs (compile `/users/{id}/*`)
//!     → matcher.rs (per-method index, sorted by specificity)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path):
//!     → router.rs (split path, look up method index)
//!     → Found / MethodNotAllowed / NotFound
//!     → before filters → handler → after filters
//!     → HttpResponse
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - Literal beats parameter beats wildcard, then registration order

pub mod builder;
pub mod config_routes;
pub mod matcher;
pub mod pattern;
pub mod router;

pub use builder::RouterBuilder;
pub use config_routes::from_config;
pub use matcher::{RegisteredRoute, RouteIndex};
pub use pattern::{PathParams, RoutePattern, Segment, WILDCARD_KEY};
pub use router::{RouteOutcome, RouteTable};
