//! Route pattern compilation and segment matching.
//!
//! # Responsibilities
//! - Compile a pattern string into literal, parameter and wildcard segments
//! - Reject malformed patterns at build time
//! - Match a request path against a compiled pattern and extract parameters
//!
//! # Design Decisions
//! - `{name}` is a parameter, `*` is a wildcard, anything else is literal
//! - Literal comparison is exact and case-sensitive
//! - Parameters match exactly one non-empty segment
//! - A wildcard must be last and matches one or more remaining segments;
//!   the remainder is captured under [`WILDCARD_KEY`]. Each segment is
//!   decoded on its own and an encoded `/` stays `%2F`, so every `/` in the
//!   captured value is a real separator
//! - Parameter values are percent-decoded; an undecodable value is a
//!   non-match rather than an error

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::RouteError;

/// Extracted path parameters, keyed by parameter name.
pub type PathParams = HashMap<String, String>;

/// Key under which a wildcard's captured remainder is stored.
pub const WILDCARD_KEY: &str = "*";

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

impl Segment {
    /// Precedence rank: literal < param < wildcard. Lower is more specific.
    pub fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 0,
            Segment::Param(_) => 1,
            Segment::Wildcard => 2,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => write!(f, "{}", s),
            Segment::Param(name) => write!(f, "{{{}}}", name),
            Segment::Wildcard => write!(f, "*"),
        }
    }
}

/// A compiled, immutable route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile `pattern`. With `ignore_trailing_slash`, `/a/` and `/a`
    /// compile to the same segments.
    pub fn compile(pattern: &str, ignore_trailing_slash: bool) -> Result<Self, RouteError> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| RouteError::MissingLeadingSlash {
                pattern: pattern.to_string(),
            })?;

        let raw = split_segments(rest, ignore_trailing_slash);
        let mut segments = Vec::with_capacity(raw.len());
        let mut names = HashSet::new();

        for (i, part) in raw.iter().enumerate() {
            let segment = parse_segment(pattern, part)?;
            match &segment {
                Segment::Wildcard if i + 1 != raw.len() => {
                    return Err(RouteError::WildcardNotLast {
                        pattern: pattern.to_string(),
                    });
                }
                Segment::Param(name) if !names.insert(name.clone()) => {
                    return Err(RouteError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
                _ => {}
            }
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Pattern text as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Declared parameter names, in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Per-segment precedence ranks, compared lexicographically.
    pub fn specificity(&self) -> Vec<u8> {
        self.segments.iter().map(Segment::rank).collect()
    }

    /// Match an already split request path.
    pub fn match_segments(&self, path: &[&str]) -> Option<PathParams> {
        let fixed = if self.has_wildcard() {
            self.segments.len() - 1
        } else {
            self.segments.len()
        };

        if self.has_wildcard() {
            if path.len() <= fixed {
                return None;
            }
        } else if path.len() != fixed {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, part) in self.segments[..fixed].iter().zip(path) {
            match segment {
                Segment::Literal(expected) => {
                    if expected != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode(part)?);
                }
                Segment::Wildcard => unreachable!("wildcard is always the last segment"),
            }
        }

        if self.has_wildcard() {
            let rest = &path[fixed..];
            if rest.iter().all(|part| part.is_empty()) {
                return None;
            }
            let decoded = rest
                .iter()
                .map(|part| decode(part).map(|d| d.replace('/', "%2F")))
                .collect::<Option<Vec<_>>>()?;
            params.insert(WILDCARD_KEY.to_string(), decoded.join("/"));
        }

        Some(params)
    }

    /// Match a raw request path.
    pub fn matches(&self, path: &str, ignore_trailing_slash: bool) -> Option<PathParams> {
        self.match_segments(&split_path(path, ignore_trailing_slash))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split a request path into segments the way patterns are split.
pub fn split_path(path: &str, ignore_trailing_slash: bool) -> Vec<&str> {
    split_segments(path.strip_prefix('/').unwrap_or(path), ignore_trailing_slash)
}

fn split_segments(rest: &str, ignore_trailing_slash: bool) -> Vec<&str> {
    if rest.is_empty() {
        return Vec::new();
    }
    let mut parts: Vec<&str> = rest.split('/').collect();
    if ignore_trailing_slash && parts.last() == Some(&"") {
        parts.pop();
    }
    parts
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, RouteError> {
    if part == "*" {
        return Ok(Segment::Wildcard);
    }
    if !part.contains(['{', '}']) {
        return Ok(Segment::Literal(part.to_string()));
    }

    let invalid = || RouteError::InvalidParam {
        pattern: pattern.to_string(),
        segment: part.to_string(),
    };
    let name = part
        .strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'))
        .ok_or_else(invalid)?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if !valid {
        return Err(invalid());
    }
    Ok(Segment::Param(name.to_string()))
}

fn decode(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(|s| s.into_owned())
}
