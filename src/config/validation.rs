//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check method names, status ranges and name uniqueness
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pattern syntax is checked by the route table build, not here

use std::collections::HashSet;

use crate::config::schema::RouterConfig;
use crate::http::method::HttpMethod;

/// A semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("route `{route}`: unknown method `{method}`")]
    UnknownMethod { route: String, method: String },

    #[error("route `{route}`: status {status} outside 100..=599")]
    InvalidStatus { route: String, status: u16 },

    #[error("route `{0}` defined more than once")]
    DuplicateRouteName(String),

    #[error("{kind} `{name}`: empty path")]
    EmptyPath { kind: &'static str, name: String },

    #[error("observability: unknown log level `{0}`")]
    UnknownLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate `config`, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for route in &config.routes {
        if route.method.parse::<HttpMethod>().is_err() {
            errors.push(ValidationError::UnknownMethod {
                route: route.name.clone(),
                method: route.method.clone(),
            });
        }
        if !(100..=599).contains(&route.status) {
            errors.push(ValidationError::InvalidStatus {
                route: route.name.clone(),
                status: route.status,
            });
        }
        if route.path.is_empty() {
            errors.push(ValidationError::EmptyPath {
                kind: "route",
                name: route.name.clone(),
            });
        }
        if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        }
    }

    for filter in &config.filters {
        if filter.path.is_empty() {
            errors.push(ValidationError::EmptyPath {
                kind: "filter",
                name: filter.name.clone(),
            });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(name: &str, method: &str, path: &str, status: u16) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            method: method.into(),
            path: path.into(),
            status,
            content_type: "text/plain".into(),
            body: String::new(),
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = RouterConfig::default();
        config.routes.push(route("a", "get", "/a", 200));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = RouterConfig::default();
        config.routes.push(route("a", "FETCH", "/a", 200));
        config.routes.push(route("b", "GET", "", 700));
        config.routes.push(route("a", "GET", "/c", 204));
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownMethod { route: "a".into(), method: "FETCH".into() },
                ValidationError::InvalidStatus { route: "b".into(), status: 700 },
                ValidationError::EmptyPath { kind: "route", name: "b".into() },
                ValidationError::DuplicateRouteName("a".into()),
                ValidationError::UnknownLogLevel("loud".into()),
            ]
        );
    }
}
