//! Outbound response representation.
//!
//! # Responsibilities
//! - Hold the final status, headers and body of a dispatched request
//! - Model single-value vs multi-value header platforms
//!
//! # Design Decisions
//! - Header representation is picked once per request and never switched
//! - Header names are case-insensitive; a name keeps the casing it was
//!   first written with
//! - Body is text; binary payloads travel base64-encoded with a flag

use std::collections::HashMap;

use serde::Serialize;

/// Response headers in the representation the platform supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseHeaders {
    /// One value per header name; writes overwrite.
    Single(HashMap<String, String>),
    /// Many values per header name; writes append.
    Multi(HashMap<String, Vec<String>>),
}

impl ResponseHeaders {
    /// Empty headers in the representation chosen by `multi_value`.
    pub fn new(multi_value: bool) -> Self {
        if multi_value {
            ResponseHeaders::Multi(HashMap::new())
        } else {
            ResponseHeaders::Single(HashMap::new())
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, ResponseHeaders::Multi(_))
    }

    /// Set a header. Multi-value headers get the value appended.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self {
            ResponseHeaders::Single(map) => {
                let key = key_for(map, name);
                map.insert(key, value.into());
            }
            ResponseHeaders::Multi(map) => {
                let key = key_for(map, name);
                map.entry(key).or_default().push(value.into());
            }
        }
    }

    /// Replace every value of a header with one value.
    pub fn replace(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self {
            ResponseHeaders::Single(map) => {
                let key = key_for(map, name);
                map.insert(key, value.into());
            }
            ResponseHeaders::Multi(map) => {
                let key = key_for(map, name);
                map.insert(key, vec![value.into()]);
            }
        }
    }

    /// First (or only) value of a header.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            ResponseHeaders::Single(map) => lookup(map, name).map(String::as_str),
            ResponseHeaders::Multi(map) => lookup(map, name)
                .and_then(|v| v.first())
                .map(String::as_str),
        }
    }

    /// All values of a header.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        match self {
            ResponseHeaders::Single(map) => lookup(map, name).map(String::as_str).into_iter().collect(),
            ResponseHeaders::Multi(map) => lookup(map, name)
                .map(|v| v.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            ResponseHeaders::Single(map) => map.clear(),
            ResponseHeaders::Multi(map) => map.clear(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ResponseHeaders::Single(map) => map.is_empty(),
            ResponseHeaders::Multi(map) => map.is_empty(),
        }
    }
}

/// Stored key for `name`: an existing key equal ignoring ASCII case, or
/// `name` itself.
fn key_for<V>(map: &HashMap<String, V>, name: String) -> String {
    if map.contains_key(&name) {
        return name;
    }
    map.keys()
        .find(|k| k.eq_ignore_ascii_case(&name))
        .cloned()
        .unwrap_or(name)
}

fn lookup<'m, V>(map: &'m HashMap<String, V>, name: &str) -> Option<&'m V> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// Final response handed back to the platform adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    pub headers: ResponseHeaders,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}
