//! Inbound request view.
//!
//! # Responsibilities
//! - Define the narrow interface the router reads requests through
//! - Provide an owned request type for embedders and tests
//!
//! # Design Decisions
//! - Header names are case-insensitive (stored lowercase)
//! - Query parameter names are case-sensitive
//! - Multi-value capability is a property of the request, not of the router

use std::collections::HashMap;

use crate::http::method::HttpMethod;

/// Read-only view of an inbound request, supplied by the platform adapter.
pub trait RequestView: Send + Sync {
    /// HTTP method of the request.
    fn method(&self) -> HttpMethod;

    /// Raw request path, without query string.
    fn path(&self) -> &str;

    /// First value of a query parameter.
    fn query_param(&self, name: &str) -> Option<&str>;

    /// All values of a query parameter, in arrival order.
    fn query_params(&self, name: &str) -> Vec<&str>;

    /// First value of a header (case-insensitive name).
    fn header(&self, name: &str) -> Option<&str>;

    /// All values of a header (case-insensitive name).
    fn header_values(&self, name: &str) -> Vec<&str>;

    /// Raw request body, if any.
    fn body(&self) -> Option<&str>;

    /// Whether [`RequestView::body`] carries base64-encoded binary.
    fn is_base64_encoded(&self) -> bool {
        false
    }

    /// Whether the platform supports multi-valued headers and parameters.
    /// Decides the response header representation for the whole request.
    fn has_multi_value_params(&self) -> bool;
}

/// Owned request implementing [`RequestView`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: HttpMethod,
    path: String,
    query: HashMap<String, Vec<String>>,
    headers: HashMap<String, Vec<String>>,
    body: Option<String>,
    base64_encoded: bool,
    multi_value: bool,
}

impl HttpRequest {
    /// Create a request with no headers, no query and no body.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: None,
            base64_encoded: false,
            multi_value: false,
        }
    }

    /// Append a header value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.into().to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Append a query parameter value.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Set a text body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.base64_encoded = false;
        self
    }

    /// Set a base64-encoded binary body.
    pub fn with_base64_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.base64_encoded = true;
        self
    }

    /// Mark the request as coming from a multi-value capable platform.
    pub fn with_multi_value(mut self, multi_value: bool) -> Self {
        self.multi_value = multi_value;
        self
    }
}

impl RequestView for HttpRequest {
    fn method(&self) -> HttpMethod {
        self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    fn query_params(&self, name: &str) -> Vec<&str> {
        self.query
            .get(name)
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn is_base64_encoded(&self) -> bool {
        self.base64_encoded
    }

    fn has_multi_value_params(&self) -> bool {
        self.multi_value
    }
}
