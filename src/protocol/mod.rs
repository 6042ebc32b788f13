//! Protocol Module
//!
//! HTTP/1.1 messages exchanged between clients and the server.
//!
//! ## Request Format
//! ```text
//! GET /api/books?genre=Fantasy HTTP/1.1
//! Host: localhost:5000
//!
//! ```
//!
//! ## Response Format
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//! Content-Length: 2
//!
//! []
//! ```
//!
//! ### Status Codes
//! - 200 / 201: success
//! - 400: invalid input or malformed request
//! - 404: unknown resource
//! - 405: known path, unsupported method
//! - 409: duplicate username or email
//! - 413: body too large
//! - 500: engine failure
//! - 503: server saturated

mod request;
mod response;
mod codec;

pub use request::{Method, Request, Version};
pub use response::{Response, Status};
pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response, DEFAULT_MAX_BODY_SIZE, MAX_HEADERS,
    MAX_LEADING_EMPTY_LINES, MAX_LINE_LENGTH, MAX_RESPONSE_BODY_SIZE,
};
