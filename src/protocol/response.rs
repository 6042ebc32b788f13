//! Response definitions
//!
//! Represents HTTP responses to clients.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CatalogError, Result};

/// Response status codes used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Status {
    Ok = 200,
    Created = 201,
    BadRequest = 400,
    NotFound = 404,
    MethodNotAllowed = 405,
    Conflict = 409,
    PayloadTooLarge = 413,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl Status {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Reason phrase for the status line
    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::Conflict => "Conflict",
            Status::PayloadTooLarge => "Payload Too Large",
            Status::InternalServerError => "Internal Server Error",
            Status::ServiceUnavailable => "Service Unavailable",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(Status::Ok),
            201 => Some(Status::Created),
            400 => Some(Status::BadRequest),
            404 => Some(Status::NotFound),
            405 => Some(Status::MethodNotAllowed),
            409 => Some(Status::Conflict),
            413 => Some(Status::PayloadTooLarge),
            500 => Some(Status::InternalServerError),
            503 => Some(Status::ServiceUnavailable),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code())
    }
}

/// A response to send to a client
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,

    /// Header fields other than Content-Length, which the codec computes
    pub headers: Vec<(String, String)>,

    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with a JSON-encoded body
    pub fn json<T: Serialize>(status: Status, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| CatalogError::Internal(format!("Cannot encode response body: {e}")))?;
        Ok(Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        })
    }

    /// Create a `{"message": ...}` response
    pub fn message(status: Status, message: &str) -> Self {
        let body = serde_json::json!({ "message": message }).to_string();
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.into_bytes(),
        }
    }

    /// Create a 200 OK response with a JSON body
    pub fn ok<T: Serialize>(value: &T) -> Result<Self> {
        Self::json(Status::Ok, value)
    }

    /// Create a 201 Created response with a JSON body
    pub fn created<T: Serialize>(value: &T) -> Result<Self> {
        Self::json(Status::Created, value)
    }

    /// Create a 404 response
    pub fn not_found(message: &str) -> Self {
        Self::message(Status::NotFound, message)
    }

    /// Create a 400 response
    pub fn bad_request(message: &str) -> Self {
        Self::message(Status::BadRequest, message)
    }

    /// Create a 500 response
    pub fn internal_error(message: &str) -> Self {
        Self::message(Status::InternalServerError, message)
    }

    /// Add a header field
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header with this name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the body as JSON
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| CatalogError::Protocol(format!("Invalid JSON body: {e}")))
    }

    /// The `message` field of an error body, if there is one
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
        value.get("message")?.as_str().map(str::to_string)
    }
}
