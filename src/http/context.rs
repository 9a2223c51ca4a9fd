//! Per-request context.
//!
//! # Responsibilities
//! - Expose request data (method, path, params, headers, body) to handlers
//! - Accumulate response state (status, headers, body)
//! - Carry attributes between filters and the handler
//!
//! # Design Decisions
//! - One context per request, owned by the dispatch call; never shared
//! - Path parameters are fixed at match time and read-only afterwards
//! - Response header representation follows the request's multi-value flag
//! - Consumed exactly once by [`Context::into_response`]

use std::any::Any;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::HandlerError;
use crate::http::method::HttpMethod;
use crate::http::request::RequestView;
use crate::http::response::{HttpResponse, ResponseHeaders};
use crate::routing::pattern::PathParams;

pub const CONTENT_TYPE: &str = "Content-Type";

/// Mutable state of one request travelling through filters and its handler.
pub struct Context<'r> {
    request: &'r dyn RequestView,
    request_id: Uuid,
    matched_path: Option<String>,
    path_params: PathParams,
    attributes: HashMap<String, Box<dyn Any + Send + Sync>>,
    status: u16,
    headers: ResponseHeaders,
    body: Option<String>,
    base64_encoded: bool,
}

impl<'r> Context<'r> {
    /// Create a context for `request`. `matched_path` is the pattern of the
    /// matched route, if any.
    pub fn new(
        request: &'r dyn RequestView,
        matched_path: Option<String>,
        path_params: PathParams,
    ) -> Self {
        let multi_value = request.has_multi_value_params();
        Self {
            request,
            request_id: Uuid::new_v4(),
            matched_path,
            path_params,
            attributes: HashMap::new(),
            status: 200,
            headers: ResponseHeaders::new(multi_value),
            body: None,
            base64_encoded: false,
        }
    }

    // --- Request side ---

    /// Underlying request view.
    pub fn request(&self) -> &dyn RequestView {
        self.request
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn method(&self) -> HttpMethod {
        self.request.method()
    }

    pub fn path(&self) -> &str {
        self.request.path()
    }

    /// Pattern of the matched route, e.g. `/items/{id}`.
    pub fn matched_path(&self) -> Option<&str> {
        self.matched_path.as_deref()
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.request.query_param(name)
    }

    pub fn query_params(&self, name: &str) -> Vec<&str> {
        self.request.query_params(name)
    }

    /// Request header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.request.header_values(name)
    }

    /// Request content type.
    pub fn content_type(&self) -> Option<&str> {
        self.request.header(CONTENT_TYPE)
    }

    /// Raw request body.
    pub fn body(&self) -> Option<&str> {
        self.request.body()
    }

    /// Deserialize the request body as JSON.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        let body = self.request.body().unwrap_or_default();
        Ok(serde_json::from_str(body)?)
    }

    // --- Attributes ---

    /// Store a value for later filters or the handler.
    pub fn set_attribute<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.attributes.insert(key.into(), Box::new(value));
        self
    }

    /// Read an attribute; `None` if absent or stored with another type.
    pub fn attribute<T: Any>(&self, key: &str) -> Option<&T> {
        self.attributes.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn remove_attribute(&mut self, key: &str) -> bool {
        self.attributes.remove(key).is_some()
    }

    // --- Response side ---

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Set a response header. Appends on multi-value platforms.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn response_headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.headers.replace(CONTENT_TYPE, content_type);
        self
    }

    pub fn write_body(&mut self, content: impl Into<String>) -> &mut Self {
        self.body = Some(content.into());
        self.base64_encoded = false;
        self
    }

    /// Write a base64-encoded binary body.
    pub fn base64_body(&mut self, content: impl Into<String>) -> &mut Self {
        self.body = Some(content.into());
        self.base64_encoded = true;
        self
    }

    pub fn text(&mut self, content: impl Into<String>) -> &mut Self {
        self.set_content_type("text/plain");
        self.write_body(content)
    }

    pub fn html(&mut self, content: impl Into<String>) -> &mut Self {
        self.set_content_type("text/html");
        self.write_body(content)
    }

    /// Serialize `value` as the JSON response body.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self, HandlerError> {
        let content = serde_json::to_string(value)?;
        self.set_content_type("application/json");
        Ok(self.write_body(content))
    }

    /// Response body written so far.
    pub fn response_body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Discard status, headers and body written so far.
    pub fn reset_response(&mut self) {
        self.headers.clear();
        self.status = 200;
        self.body = None;
        self.base64_encoded = false;
    }

    /// Finish the request and produce the response.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers,
            body: self.body,
            is_base64_encoded: self.base64_encoded,
        }
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("method", &self.method())
            .field("path", &self.path())
            .field("matched_path", &self.matched_path)
            .field("path_params", &self.path_params)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::HttpRequest;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Item {
        id: u32,
        name: String,
    }

    #[test]
    fn test_defaults() {
        let req = HttpRequest::new(HttpMethod::Get, "/items/1");
        let ctx = Context::new(&req, None, PathParams::new());

        assert_eq!(ctx.status(), 200);
        assert!(ctx.response_body().is_none());
        assert!(!ctx.response_headers().is_multi());

        let resp = ctx.into_response();
        assert_eq!(resp.status, 200);
        assert!(!resp.is_base64_encoded);
    }

    #[test]
    fn test_json_round_trip_through_body() {
        let req = HttpRequest::new(HttpMethod::Post, "/items")
            .with_body(r#"{"id":7,"name":"bolt"}"#);
        let mut ctx = Context::new(&req, None, PathParams::new());

        let item: Item = ctx.body_as().unwrap();
        assert_eq!(item, Item { id: 7, name: "bolt".into() });

        ctx.set_status(201).json(&item).unwrap();
        let resp = ctx.into_response();
        assert_eq!(resp.status, 201);
        assert_eq!(resp.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(resp.body.as_deref(), Some(r#"{"id":7,"name":"bolt"}"#));
    }

    #[test]
    fn test_body_as_rejects_missing_body() {
        let req = HttpRequest::new(HttpMethod::Post, "/items");
        let ctx = Context::new(&req, None, PathParams::new());

        let err = ctx.body_as::<Item>().unwrap_err();
        assert!(err.is::<serde_json::Error>());
    }

    #[test]
    fn test_attributes_are_typed() {
        let req = HttpRequest::new(HttpMethod::Get, "/");
        let mut ctx = Context::new(&req, None, PathParams::new());

        ctx.set_attribute("user", String::from("ada"));
        assert_eq!(ctx.attribute::<String>("user").map(String::as_str), Some("ada"));
        assert!(ctx.attribute::<u32>("user").is_none());
        assert!(ctx.remove_attribute("user"));
        assert!(ctx.attribute::<String>("user").is_none());
    }

    #[test]
    fn test_multi_value_request_gets_multi_value_headers() {
        let req = HttpRequest::new(HttpMethod::Get, "/").with_multi_value(true);
        let mut ctx = Context::new(&req, None, PathParams::new());

        ctx.set_header("Vary", "Accept").set_header("Vary", "Origin");
        let resp = ctx.into_response();
        assert_eq!(resp.headers.get_all("Vary"), vec!["Accept", "Origin"]);
    }

    #[test]
    fn test_reset_response_clears_state() {
        let req = HttpRequest::new(HttpMethod::Get, "/");
        let mut ctx = Context::new(&req, None, PathParams::new());

        ctx.set_status(418).set_header("X-Partial", "1").base64_body("AAEC");
        ctx.reset_response();

        let resp = ctx.into_response();
        assert_eq!(resp.status, 200);
        assert!(resp.headers.is_empty());
        assert!(resp.body.is_none());
        assert!(!resp.is_base64_encoded);
    }

    #[test]
    fn test_content_type_set_once_regardless_of_case() {
        let req = HttpRequest::new(HttpMethod::Get, "/");
        let mut ctx = Context::new(&req, None, PathParams::new());

        ctx.set_header("content-type", "application/xml");
        ctx.text("hi");

        let resp = ctx.into_response();
        assert_eq!(resp.header("Content-Type"), Some("text/plain"));
        assert_eq!(resp.headers.get_all("CONTENT-TYPE"), vec!["text/plain"]);
    }
}
