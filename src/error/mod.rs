//! Error types.
//!
//! - `types.rs`: registration errors and the type-erased [`HandlerError`]
//! - `handlers.rs`: the exception handler registry consulted on dispatch

pub mod handlers;
pub mod types;

pub use handlers::ExceptionHandlers;
pub use types::{BuildError, Exception, HandlerError, HandlerPanic, Message, RouteError};
