//! Route registration.
//!
//! # Responsibilities
//! - Collect routes, filters and exception handlers
//! - Compile every pattern once and report all configuration errors together
//! - Freeze the result into an immutable [`RouteTable`]
//!
//! # Design Decisions
//! - `build` consumes the builder: nothing can be registered after freeze
//! - Registering the same (method, pattern) twice is an error; patterns that
//!   differ only in parameter names are allowed and resolved by order
//! - Trailing-slash handling is a single flag applied to every pattern

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::handlers::ExceptionHandlers;
use crate::error::{BuildError, HandlerError, RouteError};
use crate::filter::{FilterChain, FilterEntry, FilterPath, Phase};
use crate::http::context::Context;
use crate::http::handler::{Handler, HandlerResult};
use crate::http::method::HttpMethod;
use crate::routing::matcher::{RegisteredRoute, RouteIndex};
use crate::routing::pattern::{RoutePattern, Segment};
use crate::routing::router::RouteTable;

/// Registration list for a [`RouteTable`].
pub struct RouterBuilder {
    routes: Vec<(HttpMethod, String, Arc<dyn Handler>)>,
    filters: Vec<(Phase, String, Arc<dyn Handler>)>,
    exceptions: ExceptionHandlers,
    not_found: Option<Arc<dyn Handler>>,
    method_not_allowed: Option<Arc<dyn Handler>>,
    ignore_trailing_slash: bool,
    metrics_enabled: bool,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_shortcut {
    ($($name:ident => $method:expr),* $(,)?) => {
        $(
            #[doc = concat!("Register a `", stringify!($name), "` route.")]
            pub fn $name<F>(self, pattern: &str, handler: F) -> Self
            where
                F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
            {
                self.route($method, pattern, handler)
            }
        )*
    };
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            filters: Vec::new(),
            exceptions: ExceptionHandlers::new(),
            not_found: None,
            method_not_allowed: None,
            ignore_trailing_slash: true,
            metrics_enabled: true,
        }
    }

    /// Treat `/a/` and `/a` as the same path. Defaults to `true`.
    pub fn ignore_trailing_slash(mut self, ignore: bool) -> Self {
        self.ignore_trailing_slash = ignore;
        self
    }

    /// Record dispatch metrics. Defaults to `true`.
    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn route<F>(self, method: HttpMethod, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_route(method, pattern, Arc::new(handler))
    }

    /// Register a route backed by any [`Handler`].
    pub fn add_route(mut self, method: HttpMethod, pattern: &str, handler: Arc<dyn Handler>) -> Self {
        self.routes.push((method, pattern.to_string(), handler));
        self
    }

    method_shortcut! {
        get => HttpMethod::Get,
        post => HttpMethod::Post,
        put => HttpMethod::Put,
        patch => HttpMethod::Patch,
        delete => HttpMethod::Delete,
        head => HttpMethod::Head,
        options => HttpMethod::Options,
    }

    /// Register a filter run before the handler for every path matching
    /// `pattern` (`*` matches all paths).
    pub fn before<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_filter(Phase::Before, pattern, Arc::new(handler))
    }

    /// Register a filter run after the handler, even when it failed.
    pub fn after<F>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_filter(Phase::After, pattern, Arc::new(handler))
    }

    pub fn add_filter(mut self, phase: Phase, pattern: &str, handler: Arc<dyn Handler>) -> Self {
        self.filters.push((phase, pattern.to_string(), handler));
        self
    }

    /// Register an exception handler for errors of type `E`.
    pub fn exception<E, F>(mut self, handler: F) -> Self
    where
        E: 'static,
        F: Fn(&E, &mut Context<'_>) + Send + Sync + 'static,
    {
        self.exceptions.register::<E, F>(handler);
        self
    }

    /// Declare `P` as the parent of error type `S`.
    pub fn declare_parent<S, P>(mut self) -> Self
    where
        S: AsRef<P> + 'static,
        P: 'static,
    {
        self.exceptions.declare_parent::<S, P>();
        self
    }

    /// Handler for errors with no registered exception handler.
    pub fn fallback_exception_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&HandlerError, &mut Context<'_>) + Send + Sync + 'static,
    {
        self.exceptions.set_fallback(handler);
        self
    }

    /// Replace the built-in 404 response.
    pub fn not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(handler));
        self
    }

    /// Replace the built-in 405 response. The `Allow` header is already set
    /// when the handler runs.
    pub fn method_not_allowed<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.method_not_allowed = Some(Arc::new(handler));
        self
    }

    /// Compile every pattern and freeze the table.
    pub fn build(self) -> Result<RouteTable, BuildError> {
        let mut errors = Vec::new();
        let mut indexes: [RouteIndex; HttpMethod::COUNT] = std::array::from_fn(|_| RouteIndex::new());
        let mut seen: HashSet<(HttpMethod, Vec<Segment>)> = HashSet::new();

        for (order, (method, pattern, handler)) in self.routes.into_iter().enumerate() {
            let compiled = match RoutePattern::compile(&pattern, self.ignore_trailing_slash) {
                Ok(p) => p,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            if !seen.insert((method, compiled.segments().to_vec())) {
                errors.push(RouteError::DuplicateRoute { method, pattern });
                continue;
            }
            indexes[method.index()].push(RegisteredRoute {
                method,
                pattern: compiled,
                handler,
                order,
            });
        }

        let mut filters = FilterChain::new();
        for (phase, pattern, handler) in self.filters {
            match FilterPath::compile(&pattern, self.ignore_trailing_slash) {
                Ok(path) => filters.push(FilterEntry { phase, path, handler }),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            for e in &errors {
                tracing::error!(error = %e, "Invalid route registration");
            }
            return Err(BuildError { errors });
        }

        for index in &mut indexes {
            index.freeze();
        }

        let table = RouteTable {
            indexes,
            filters,
            exceptions: self.exceptions,
            not_found: self.not_found,
            method_not_allowed: self.method_not_allowed,
            ignore_trailing_slash: self.ignore_trailing_slash,
            metrics_enabled: self.metrics_enabled,
        };

        tracing::info!(
            routes = table.routes().count(),
            filters = table.filters().len(),
            exception_handlers = table.exception_handlers().len(),
            ignore_trailing_slash = table.ignore_trailing_slash(),
            "Route table built"
        );
        Ok(table)
    }
}
