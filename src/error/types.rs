//! Error types: build-time configuration errors and handler-raised errors.

use std::any::{Any, TypeId};
use std::error::Error as StdError;
use std::fmt;

use crate::http::method::HttpMethod;

/// Configuration error detected while compiling patterns or building the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("pattern `{pattern}` must start with '/'")]
    MissingLeadingSlash { pattern: String },

    #[error("pattern `{pattern}`: wildcard must be the last segment")]
    WildcardNotLast { pattern: String },

    #[error("pattern `{pattern}`: duplicate parameter `{name}`")]
    DuplicateParam { pattern: String, name: String },

    #[error("pattern `{pattern}`: invalid parameter segment `{segment}`")]
    InvalidParam { pattern: String, segment: String },

    #[error("route {method} {pattern} registered more than once")]
    DuplicateRoute { method: HttpMethod, pattern: String },

    #[error("route `{pattern}`: {source}")]
    UnknownMethod {
        pattern: String,
        source: crate::http::method::UnknownMethod,
    },
}

/// All configuration errors found by a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    pub errors: Vec<RouteError>,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route table build failed: ")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl StdError for BuildError {}

/// Object-safe view of any error a handler can raise.
pub trait Exception: StdError + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static);
}

impl<T: StdError + Send + Sync + 'static> Exception for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }
}

/// Error raised by a handler or filter.
///
/// Wraps any `std::error::Error` and remembers its concrete type, which is
/// the key the exception registry resolves handlers by. Any error converts
/// with `?`.
pub struct HandlerError {
    inner: Box<dyn Exception>,
    error_type: TypeId,
    type_name: &'static str,
}

impl HandlerError {
    pub fn new<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self {
            inner: Box::new(error),
            error_type: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
        }
    }

    /// Ad-hoc error carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Concrete type of the wrapped error.
    pub fn error_type(&self) -> TypeId {
        self.error_type
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<E: 'static>(&self) -> bool {
        self.error_type == TypeId::of::<E>()
    }

    pub fn downcast_ref<E: 'static>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref::<E>()
    }

    pub fn as_any(&self) -> &dyn Any {
        self.inner.as_any()
    }

    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_error()
    }
}

impl<E: StdError + Send + Sync + 'static> From<E> for HandlerError {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner.as_error(), f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError")
            .field("type", &self.type_name)
            .field("error", &self.inner.as_error())
            .finish()
    }
}

/// Plain message error created by [`HandlerError::msg`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Message(pub String);

/// A handler, filter or miss handler panicked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("handler panicked: {message}")]
pub struct HandlerPanic {
    pub message: String,
}

impl HandlerPanic {
    pub(crate) fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}
