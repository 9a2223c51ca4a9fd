//! HTTP request and response model.
//!
//! # Data Flow
//! ```text
//! Embedder's request (any transport)
//!     → request.rs (RequestView: method, path, query, headers, body)
//!     → context.rs (per-request state handed to every handler)
//!     → handler.rs (routes, filters and miss handlers)
//!     → response.rs (status, headers, body)
//! ```
//!
//! Nothing here does socket I/O. The embedder adapts its own request type
//! through [`RequestView`] and serializes the returned [`HttpResponse`].

pub mod context;
pub mod handler;
pub mod method;
pub mod request;
pub mod response;

pub use context::Context;
pub use handler::{Handler, HandlerResult};
pub use method::HttpMethod;
pub use request::{HttpRequest, RequestView};
pub use response::{HttpResponse, ResponseHeaders};
