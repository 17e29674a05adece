//! Incoming request type.
//!
//! Deliberately minimal: method, path, headers, and a type-keyed
//! extensions map. The extensions map is where this crate publishes the
//! per-request connection slots — see [`context`](crate::context) — and
//! where a transport adapter may stash anything else it likes. Keys are
//! Rust types, so unrelated libraries sharing one request can never
//! collide.

use http::Extensions;

use crate::method::Method;

/// An incoming HTTP request as the pipeline sees it.
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    extensions: Extensions,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Appends a header. Transport adapters call this while building the
    /// request; handlers normally only read.
    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// The request's type-keyed storage.
    pub fn extensions(&self) -> &Extensions { &self.extensions }

    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}
