//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::filter::Phase;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Route table settings.
    pub router: RouterSettings,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Routes answered with a static response.
    pub routes: Vec<RouteConfig>,

    /// Access-log filters.
    pub filters: Vec<FilterConfig>,
}

/// Route table settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Treat `/a/` and `/a` as the same path.
    pub ignore_trailing_slash: bool,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            ignore_trailing_slash: true,
        }
    }
}

/// A route answered with a fixed response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging.
    pub name: String,

    /// HTTP method, e.g. "GET".
    pub method: String,

    /// Route pattern, e.g. "/items/{id}".
    pub path: String,

    /// Response status.
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response content type.
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Response body; `{name}` is replaced by the path parameter `name`.
    #[serde(default)]
    pub body: String,
}

fn default_status() -> u16 {
    200
}

fn default_content_type() -> String {
    "text/plain".to_string()
}

/// An access-log filter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Name shown in log events.
    pub name: String,

    /// Before or after the handler.
    pub phase: Phase,

    /// Path pattern; `*` matches every path.
    #[serde(default = "default_filter_path")]
    pub path: String,
}

fn default_filter_path() -> String {
    "*".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Record dispatch metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}
