//! Route table and per-request dispatch.
//!
//! # Responsibilities
//! - Store compiled routes grouped by method, filters and exception handlers
//! - Resolve (method, path) to a route, a method-not-allowed or a not-found
//! - Run one request through filters, handler and exception handling
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - One index per method in a fixed-size array
//! - Explicit NotFound / MethodNotAllowed rather than a silent default
//! - `dispatch` always returns a response; errors and panics never escape
//!
//! # Request States
//! ```text
//! Unmatched → Matched → Executed → Responded
//! ```
//! `Matched` when the outcome is selected and parameters are extracted,
//! `Executed` once before filters, handler (or miss terminal) and after
//! filters have run, `Responded` when the context is consumed.

use std::sync::Arc;
use std::time::Instant;

use crate::error::handlers::ExceptionHandlers;
use crate::error::HandlerError;
use crate::filter::FilterChain;
use crate::http::context::Context;
use crate::http::handler::{run_guarded, Handler, HandlerResult};
use crate::http::method::HttpMethod;
use crate::http::request::RequestView;
use crate::http::response::HttpResponse;
use crate::observability::metrics;
use crate::routing::builder::RouterBuilder;
use crate::routing::matcher::{RegisteredRoute, RouteIndex};
use crate::routing::pattern::{split_path, PathParams};

/// Result of resolving a method and path.
#[derive(Debug)]
pub enum RouteOutcome<'t> {
    Found {
        route: &'t RegisteredRoute,
        params: PathParams,
    },
    /// The path matches under other methods only.
    MethodNotAllowed { allowed: Vec<HttpMethod> },
    NotFound,
}

impl RouteOutcome<'_> {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RouteOutcome::Found { .. } => "found",
            RouteOutcome::MethodNotAllowed { .. } => "method_not_allowed",
            RouteOutcome::NotFound => "not_found",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RouteOutcome::Found { .. })
    }
}

/// What the dispatcher runs between before and after filters.
enum Target<'t> {
    Route(&'t dyn Handler),
    MethodNotAllowed(Vec<HttpMethod>),
    NotFound,
}

/// The frozen route table.
pub struct RouteTable {
    pub(crate) indexes: [RouteIndex; HttpMethod::COUNT],
    pub(crate) filters: FilterChain,
    pub(crate) exceptions: ExceptionHandlers,
    pub(crate) not_found: Option<Arc<dyn Handler>>,
    pub(crate) method_not_allowed: Option<Arc<dyn Handler>>,
    pub(crate) ignore_trailing_slash: bool,
    pub(crate) metrics_enabled: bool,
}

impl RouteTable {
    /// Start registering routes.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn ignore_trailing_slash(&self) -> bool {
        self.ignore_trailing_slash
    }

    /// Index for one method.
    pub fn index(&self, method: HttpMethod) -> &RouteIndex {
        &self.indexes[method.index()]
    }

    /// All routes, grouped by method, in match order.
    pub fn routes(&self) -> impl Iterator<Item = &RegisteredRoute> {
        self.indexes.iter().flat_map(|index| index.routes())
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    pub fn exception_handlers(&self) -> &ExceptionHandlers {
        &self.exceptions
    }

    /// Resolve `method` and `path`.
    pub fn find(&self, method: HttpMethod, path: &str) -> RouteOutcome<'_> {
        let segments = split_path(path, self.ignore_trailing_slash);
        self.find_segments(method, &segments)
    }

    fn find_segments(&self, method: HttpMethod, segments: &[&str]) -> RouteOutcome<'_> {
        if let Some((route, params)) = self.index(method).find(segments) {
            return RouteOutcome::Found { route, params };
        }

        let allowed: Vec<HttpMethod> = HttpMethod::ALL
            .into_iter()
            .filter(|m| *m != method && self.index(*m).matches_any(segments))
            .collect();

        if allowed.is_empty() {
            RouteOutcome::NotFound
        } else {
            RouteOutcome::MethodNotAllowed { allowed }
        }
    }

    /// Run one request to completion.
    pub fn dispatch(&self, request: &dyn RequestView) -> HttpResponse {
        let start = Instant::now();
        let method = request.method();
        let segments = split_path(request.path(), self.ignore_trailing_slash);

        let outcome = self.find_segments(method, &segments);
        let label = outcome.label();
        let (target, matched_path, params) = match outcome {
            RouteOutcome::Found { route, params } => (
                Target::Route(route.handler.as_ref()),
                Some(route.pattern.as_str().to_string()),
                params,
            ),
            RouteOutcome::MethodNotAllowed { allowed } => {
                (Target::MethodNotAllowed(allowed), None, PathParams::new())
            }
            RouteOutcome::NotFound => (Target::NotFound, None, PathParams::new()),
        };

        let mut ctx = Context::new(request, matched_path, params);
        let span = tracing::debug_span!(
            "dispatch",
            request_id = %ctx.request_id(),
            method = %method,
            path = %request.path(),
        );
        let _entered = span.enter();
        tracing::debug!(outcome = label, matched = ?ctx.matched_path(), "Route resolved");

        let mut before_failed = false;
        for filter in self.filters.before_for(&segments) {
            if let Err(err) = run_guarded(filter.handler.as_ref(), &mut ctx) {
                self.raise(err, &mut ctx);
                before_failed = true;
                break;
            }
        }

        if !before_failed {
            let result = match &target {
                Target::Route(handler) => run_guarded(*handler, &mut ctx),
                Target::MethodNotAllowed(allowed) => self.respond_method_not_allowed(allowed, &mut ctx),
                Target::NotFound => self.respond_not_found(&mut ctx),
            };
            if let Err(err) = result {
                self.raise(err, &mut ctx);
            }
        }

        for filter in self.filters.after_for(&segments) {
            if let Err(err) = run_guarded(filter.handler.as_ref(), &mut ctx) {
                self.raise(err, &mut ctx);
            }
        }

        let response = ctx.into_response();
        if self.metrics_enabled {
            metrics::record_dispatch(method, label, response.status, start);
        }
        tracing::debug!(status = response.status, outcome = label, "Request dispatched");
        response
    }

    fn raise(&self, err: HandlerError, ctx: &mut Context<'_>) {
        if self.metrics_enabled {
            metrics::record_handler_error(err.type_name());
        }
        self.exceptions.handle(&err, ctx);
    }

    fn respond_not_found(&self, ctx: &mut Context<'_>) -> HandlerResult {
        match &self.not_found {
            Some(handler) => run_guarded(handler.as_ref(), ctx),
            None => {
                ctx.set_status(404).text("Not Found");
                Ok(())
            }
        }
    }

    fn respond_method_not_allowed(&self, allowed: &[HttpMethod], ctx: &mut Context<'_>) -> HandlerResult {
        let allow = allowed
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ctx.set_header("Allow", allow);
        match &self.method_not_allowed {
            Some(handler) => run_guarded(handler.as_ref(), ctx),
            None => {
                ctx.set_status(405).text("Method Not Allowed");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes().collect::<Vec<_>>())
            .field("filters", &self.filters)
            .field("exceptions", &self.exceptions)
            .field("ignore_trailing_slash", &self.ignore_trailing_slash)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::HttpRequest;
    use crate::routing::pattern::WILDCARD_KEY;

    fn ok(_: &mut Context<'_>) -> HandlerResult {
        Ok(())
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_table_is_send_sync() {
        assert_send_sync::<RouteTable>();
    }

    #[test]
    fn test_find_outcomes() {
        let table = RouteTable::builder()
            .get("/x", ok)
            .put("/x", ok)
            .get("/items/{id}", ok)
            .build()
            .unwrap();

        match table.find(HttpMethod::Get, "/items/42") {
            RouteOutcome::Found { route, params } => {
                assert_eq!(route.pattern.as_str(), "/items/{id}");
                assert_eq!(params["id"], "42");
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        match table.find(HttpMethod::Post, "/x") {
            RouteOutcome::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![HttpMethod::Get, HttpMethod::Put]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        assert!(matches!(table.find(HttpMethod::Get, "/y"), RouteOutcome::NotFound));
    }

    #[test]
    fn test_wildcard_key_in_params() {
        let table = RouteTable::builder().get("/files/*", ok).build().unwrap();
        match table.find(HttpMethod::Get, "/files/a/b/c") {
            RouteOutcome::Found { params, .. } => assert_eq!(params[WILDCARD_KEY], "a/b/c"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(table.find(HttpMethod::Get, "/files"), RouteOutcome::NotFound));
    }

    #[test]
    fn test_default_miss_responses() {
        let table = RouteTable::builder()
            .get("/x", ok)
            .delete("/x", ok)
            .build()
            .unwrap();

        let resp = table.dispatch(&HttpRequest::new(HttpMethod::Post, "/x"));
        assert_eq!(resp.status, 405);
        assert_eq!(resp.header("Allow"), Some("GET, DELETE"));

        let resp = table.dispatch(&HttpRequest::new(HttpMethod::Get, "/nope"));
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body.as_deref(), Some("Not Found"));
    }

    #[test]
    fn test_custom_miss_handlers() {
        let table = RouteTable::builder()
            .get("/x", ok)
            .not_found(|ctx| {
                ctx.set_status(404).json(&serde_json::json!({ "error": "no route" }))?;
                Ok(())
            })
            .method_not_allowed(|ctx| {
                ctx.set_status(405).text("use GET");
                Ok(())
            })
            .build()
            .unwrap();

        let resp = table.dispatch(&HttpRequest::new(HttpMethod::Get, "/nope"));
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body.as_deref(), Some(r#"{"error":"no route"}"#));

        let resp = table.dispatch(&HttpRequest::new(HttpMethod::Patch, "/x"));
        assert_eq!(resp.status, 405);
        assert_eq!(resp.header("Allow"), Some("GET"));
        assert_eq!(resp.body.as_deref(), Some("use GET"));
    }

    #[test]
    fn test_matched_path_and_params_reach_handler() {
        let table = RouteTable::builder()
            .get("/users/{id}/posts/{post}", |ctx| {
                let body = format!(
                    "{}|{}|{}",
                    ctx.matched_path().unwrap_or_default(),
                    ctx.path_param("id").unwrap_or_default(),
                    ctx.path_param("post").unwrap_or_default()
                );
                ctx.text(body);
                Ok(())
            })
            .build()
            .unwrap();

        let resp = table.dispatch(&HttpRequest::new(HttpMethod::Get, "/users/7/posts/hello%20world"));
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body.as_deref(), Some("/users/{id}/posts/{post}|7|hello world"));
    }

    #[test]
    fn test_handler_panic_is_contained() {
        let table = RouteTable::builder()
            .get("/boom", |_| panic!("kaboom"))
            .build()
            .unwrap();

        let resp = table.dispatch(&HttpRequest::new(HttpMethod::Get, "/boom"));
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body.as_deref(), Some("Internal Server Error"));
    }
}
