//! Request definitions
//!
//! Represents HTTP requests from clients.

use std::fmt;

use serde::Serialize;

use crate::error::{CatalogError, Result};

/// Request methods understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    /// Parse a request-line method token (case-sensitive, as in HTTP)
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(CatalogError::Protocol(format!(
                "Unsupported method: {token}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol version from the request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "HTTP/1.0" => Ok(Version::Http10),
            "HTTP/1.1" => Ok(Version::Http11),
            _ => Err(CatalogError::Protocol(format!(
                "Unsupported HTTP version: {token}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

/// A parsed request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,

    /// Path component of the target, without the query string
    pub path: String,

    /// Percent-decoded query parameters, in order of appearance
    pub query: Vec<(String, String)>,

    pub version: Version,

    /// Header fields as received (names keep the case they were sent in)
    pub headers: Vec<(String, String)>,

    pub body: Vec<u8>,
}

impl Request {
    /// Create an HTTP/1.1 request for `target` (path plus optional query)
    pub fn new(method: Method, target: &str) -> Result<Self> {
        let (path, query) = parse_target(target)?;
        Ok(Self {
            method,
            path,
            query,
            version: Version::Http11,
            headers: Vec::new(),
            body: Vec::new(),
        })
    }

    /// Add a header field
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body and the matching content type
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.body = serde_json::to_vec(value)
            .map_err(|e| CatalogError::Protocol(format!("Cannot encode request body: {e}")))?;
        Ok(self.with_header("Content-Type", "application/json"))
    }

    /// First header with this name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// First query parameter with this name
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Non-empty path segments, e.g. `/api/books/3` -> `["api", "books", "3"]`
    pub fn path_segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Whether the connection should close after this request
    ///
    /// HTTP/1.1 keeps connections alive unless told otherwise; HTTP/1.0
    /// closes them unless asked to keep alive.
    pub fn wants_close(&self) -> bool {
        let connection = self.header("Connection").map(str::to_ascii_lowercase);
        match self.version {
            Version::Http11 => connection.as_deref() == Some("close"),
            Version::Http10 => connection.as_deref() != Some("keep-alive"),
        }
    }

    /// Path plus re-encoded query string, as written on the request line
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// Split a request target into its path and decoded query parameters
pub(crate) fn parse_target(target: &str) -> Result<(String, Vec<(String, String)>)> {
    if !target.starts_with('/') {
        return Err(CatalogError::Protocol(format!(
            "Request target must be an absolute path: {target}"
        )));
    }

    let (path, raw_query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };

    let mut query = Vec::new();
    for pair in raw_query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        query.push((decode_component(key)?, decode_component(value)?));
    }

    Ok((path.to_string(), query))
}

/// Percent-decode a query component, treating `+` as a space
fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CatalogError::Protocol(format!("Malformed query string: {e}")))
}
