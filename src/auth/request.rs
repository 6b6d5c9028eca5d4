//! Request view handed to the authentication core.
//!
//! The core never parses raw transport bytes; the HTTP layer builds a
//! `RequestParts` from the incoming request and the strategies only read
//! headers and cookie values through it.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

/// Path and headers of an incoming request.
#[derive(Clone, Debug)]
pub struct RequestParts {
    path: String,
    headers: HeaderMap,
}

impl RequestParts {
    #[must_use]
    pub fn new(path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            path: path.into(),
            headers,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A header value, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION)?.to_str().ok()
    }

    /// A cookie value by name from the `Cookie` header.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        let value = self.headers.get(COOKIE)?.to_str().ok()?;
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == name {
                return Some(val.trim().to_string());
            }
        }
        None
    }
}
