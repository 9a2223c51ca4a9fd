//! Request routing and dispatch engine.
//!
//! Routes are registered on a [`RouterBuilder`], frozen into a
//! [`RouteTable`] and shared across threads. Each call to
//! [`RouteTable::dispatch`] runs one request through before filters, the
//! matched handler, after filters and exception handling.

pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use error::{BuildError, HandlerError, RouteError};
pub use http::{Context, HandlerResult, HttpMethod, HttpRequest, HttpResponse, RequestView};
pub use routing::{RouteOutcome, RouteTable, RouterBuilder};
