//! Type-indexed exception handler registry.
//!
//! # Responsibilities
//! - Map error types to the handler that turns them into a response
//! - Walk a declared type hierarchy from most to least specific
//! - Guarantee a response when nothing is registered
//!
//! # Design Decisions
//! - The hierarchy is declared with [`ExceptionHandlers::declare_parent`];
//!   a child exposes its parent view through `AsRef<Parent>`
//! - Resolution order: concrete type, then declared parents breadth-first
//!   in declaration order
//! - Response state is reset before an exception handler runs
//! - A panicking exception handler degrades to the built-in 500 response

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::types::HandlerError;
use crate::http::context::Context;

type ErasedHandler = Arc<dyn Fn(&dyn Any, &mut Context<'_>) + Send + Sync>;

/// Handler used when no registered handler matches an error.
pub type FallbackHandler = Arc<dyn Fn(&HandlerError, &mut Context<'_>) + Send + Sync>;

struct Entry {
    type_name: &'static str,
    handler: ErasedHandler,
}

/// Declared parent of an error type and how to view the child as the parent.
#[derive(Clone, Copy)]
struct Parent {
    type_id: TypeId,
    cast: fn(&dyn Any) -> Option<&dyn Any>,
}

fn upcast<S, P>(value: &dyn Any) -> Option<&dyn Any>
where
    S: AsRef<P> + 'static,
    P: 'static,
{
    value
        .downcast_ref::<S>()
        .map(|child| AsRef::<P>::as_ref(child) as &dyn Any)
}

/// Registry of exception handlers keyed by error type.
#[derive(Default)]
pub struct ExceptionHandlers {
    handlers: HashMap<TypeId, Entry>,
    parents: HashMap<TypeId, Vec<Parent>>,
    fallback: Option<FallbackHandler>,
}

/// A handler selected for a specific error.
pub struct Resolved<'h, 'e> {
    handler: &'h ErasedHandler,
    view: &'e dyn Any,
    /// Type name the handler was registered for.
    pub handled_as: &'static str,
}

impl Resolved<'_, '_> {
    pub fn invoke(&self, ctx: &mut Context<'_>) {
        (self.handler)(self.view, ctx)
    }
}

impl ExceptionHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for errors of type `E`. Replaces any earlier
    /// handler for the same type.
    pub fn register<E, F>(&mut self, handler: F)
    where
        E: 'static,
        F: Fn(&E, &mut Context<'_>) + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<E>();
        let erased: ErasedHandler = Arc::new(move |error: &dyn Any, ctx: &mut Context<'_>| {
            if let Some(error) = error.downcast_ref::<E>() {
                handler(error, ctx);
            }
        });
        if self
            .handlers
            .insert(TypeId::of::<E>(), Entry { type_name, handler: erased })
            .is_some()
        {
            tracing::debug!(error_type = type_name, "Replacing exception handler");
        }
    }

    /// Declare `P` as a parent of `S`. Handlers for `P` then apply to `S`
    /// when `S` has no handler of its own.
    pub fn declare_parent<S, P>(&mut self)
    where
        S: AsRef<P> + 'static,
        P: 'static,
    {
        let parents = self.parents.entry(TypeId::of::<S>()).or_default();
        if parents.iter().all(|p| p.type_id != TypeId::of::<P>()) {
            parents.push(Parent {
                type_id: TypeId::of::<P>(),
                cast: upcast::<S, P>,
            });
        }
    }

    /// Handler for errors nothing else claims.
    pub fn set_fallback<F>(&mut self, handler: F)
    where
        F: Fn(&HandlerError, &mut Context<'_>) + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Find the most specific handler for `error`.
    pub fn resolve<'h, 'e>(&'h self, error: &'e HandlerError) -> Option<Resolved<'h, 'e>> {
        let mut queue: VecDeque<(TypeId, &'e dyn Any)> = VecDeque::new();
        let mut seen = HashSet::new();
        queue.push_back((error.error_type(), error.as_any()));

        while let Some((type_id, view)) = queue.pop_front() {
            if !seen.insert(type_id) {
                continue;
            }
            if let Some(entry) = self.handlers.get(&type_id) {
                return Some(Resolved {
                    handler: &entry.handler,
                    view,
                    handled_as: entry.type_name,
                });
            }
            for parent in self.parents.get(&type_id).into_iter().flatten() {
                if let Some(parent_view) = (parent.cast)(view) {
                    queue.push_back((parent.type_id, parent_view));
                }
            }
        }
        None
    }

    /// Convert `error` into response state on `ctx`.
    ///
    /// Never panics: a panicking handler is replaced by the built-in
    /// internal-error response.
    pub fn handle(&self, error: &HandlerError, ctx: &mut Context<'_>) {
        ctx.reset_response();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match self.resolve(error) {
            Some(resolved) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    error_type = error.type_name(),
                    handled_as = resolved.handled_as,
                    error = %error,
                    "Handler error converted"
                );
                resolved.invoke(ctx);
            }
            None => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        error_type = error.type_name(),
                        error = %error,
                        "Handler error sent to fallback handler"
                    );
                    fallback(error, ctx);
                }
                None => internal_error(error, ctx),
            },
        }));

        if outcome.is_err() {
            tracing::error!(
                request_id = %ctx.request_id(),
                error_type = error.type_name(),
                "Exception handler panicked"
            );
            ctx.reset_response();
            internal_error(error, ctx);
        }
    }
}

/// Built-in response for errors with no handler.
pub fn internal_error(error: &HandlerError, ctx: &mut Context<'_>) {
    tracing::error!(
        request_id = %ctx.request_id(),
        error_type = error.type_name(),
        error = %error,
        "Unhandled handler error"
    );
    ctx.set_status(500).text("Internal Server Error");
}

impl fmt::Debug for ExceptionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        f.debug_struct("ExceptionHandlers")
            .field("handlers", &names)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
