//! Per-method route index.
//!
//! # Responsibilities
//! - Hold the compiled routes registered for one HTTP method
//! - Return the single best match for a path
//!
//! # Design Decisions
//! - Routes are sorted once by specificity (literal > param > wildcard,
//!   compared left to right); the sort is stable so equally specific
//!   routes keep registration order
//! - After sorting, the first match in index order is the best match
//! - Read-only after [`RouteIndex::freeze`]

use std::fmt;
use std::sync::Arc;

use crate::http::handler::Handler;
use crate::http::method::HttpMethod;
use crate::routing::pattern::{PathParams, RoutePattern};

/// A route as stored in the table.
#[derive(Clone)]
pub struct RegisteredRoute {
    pub method: HttpMethod,
    pub pattern: RoutePattern,
    pub handler: Arc<dyn Handler>,
    /// Position in the registration list, used for tie-breaking.
    pub order: usize,
}

impl fmt::Debug for RegisteredRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRoute")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("order", &self.order)
            .finish()
    }
}

/// Routes for one HTTP method.
#[derive(Debug, Default, Clone)]
pub struct RouteIndex {
    routes: Vec<RegisteredRoute>,
}

impl RouteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, route: RegisteredRoute) {
        self.routes.push(route);
    }

    /// Order routes by specificity, ties by registration order.
    pub fn freeze(&mut self) {
        self.routes
            .sort_by_cached_key(|r| (r.pattern.specificity(), r.order));
    }

    pub fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Best route for already split path segments.
    pub fn find(&self, segments: &[&str]) -> Option<(&RegisteredRoute, PathParams)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.match_segments(segments).map(|p| (route, p)))
    }

    /// Whether any route in this index matches.
    pub fn matches_any(&self, segments: &[&str]) -> bool {
        self.routes
            .iter()
            .any(|route| route.pattern.match_segments(segments).is_some())
    }
}
