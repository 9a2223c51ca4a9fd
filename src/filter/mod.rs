//! Before/after filter chain.
//!
//! # Data Flow
//! ```text
//! request path
//!     → FilterChain::before_for(path)   (every matching Before, registration order)
//!     → route handler / miss terminal
//!     → FilterChain::after_for(path)    (every matching After, registration order)
//! ```
//!
//! # Design Decisions
//! - Filters are keyed by path only, never by method
//! - All matching filters run, not just the first
//! - The pattern `*` matches every path, including `/`

use std::fmt;
use std::sync::Arc;

use crate::error::RouteError;
use crate::http::handler::Handler;
use crate::routing::pattern::RoutePattern;

/// Pattern text that matches every path.
pub const MATCH_ALL: &str = "*";

/// When a filter runs relative to the route handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Before,
    After,
}

/// Path guard of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPath {
    All,
    Pattern(RoutePattern),
}

impl FilterPath {
    pub fn compile(pattern: &str, ignore_trailing_slash: bool) -> Result<Self, RouteError> {
        if pattern == MATCH_ALL {
            Ok(FilterPath::All)
        } else {
            RoutePattern::compile(pattern, ignore_trailing_slash).map(FilterPath::Pattern)
        }
    }

    pub fn matches(&self, segments: &[&str]) -> bool {
        match self {
            FilterPath::All => true,
            FilterPath::Pattern(p) => p.match_segments(segments).is_some(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilterPath::All => MATCH_ALL,
            FilterPath::Pattern(p) => p.as_str(),
        }
    }
}

/// One registered filter.
#[derive(Clone)]
pub struct FilterEntry {
    pub phase: Phase,
    pub path: FilterPath,
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEntry")
            .field("phase", &self.phase)
            .field("path", &self.path.as_str())
            .finish()
    }
}

/// Ordered before and after filters.
#[derive(Debug, Default, Clone)]
pub struct FilterChain {
    before: Vec<FilterEntry>,
    after: Vec<FilterEntry>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FilterEntry) {
        match entry.phase {
            Phase::Before => self.before.push(entry),
            Phase::After => self.after.push(entry),
        }
    }

    /// Before filters matching `segments`, in registration order.
    pub fn before_for<'a>(&'a self, segments: &'a [&'a str]) -> impl Iterator<Item = &'a FilterEntry> + 'a {
        self.before.iter().filter(move |f| f.path.matches(segments))
    }

    /// After filters matching `segments`, in registration order.
    pub fn after_for<'a>(&'a self, segments: &'a [&'a str]) -> impl Iterator<Item = &'a FilterEntry> + 'a {
        self.after.iter().filter(move |f| f.path.matches(segments))
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}
