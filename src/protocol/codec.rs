//! Protocol codec
//!
//! Encoding and decoding functions for HTTP/1.1 messages.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! METHOD SP target SP HTTP/1.1 CRLF
//! (name: value CRLF)*
//! CRLF
//! body (Content-Length bytes)
//! ```
//!
//! ### Response
//! ```text
//! HTTP/1.1 SP code SP reason CRLF
//! (name: value CRLF)*
//! CRLF
//! body (Content-Length bytes)
//! ```
//!
//! Bodies are always framed by Content-Length. Chunked transfer encoding
//! is rejected.

use std::io::{BufRead, Cursor, Read, Write};

use crate::error::{CatalogError, Result};
use super::request::parse_target;
use super::{Method, Request, Response, Status, Version};

/// Longest accepted request/status/header line, CRLF included
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Maximum number of header fields per message
pub const MAX_HEADERS: usize = 100;

/// Empty lines tolerated before a request line
pub const MAX_LEADING_EMPTY_LINES: usize = 2;

/// Default maximum request body size (1 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Maximum response body size accepted by clients (16 MB)
pub const MAX_RESPONSE_BODY_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Any Content-Length header on the request is replaced by the real one.
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut head = format!(
        "{} {} {}\r\n",
        request.method,
        request.target(),
        request.version.as_str()
    );
    push_headers(&mut head, &request.headers);
    if !request.body.is_empty()
        || matches!(request.method, Method::Post | Method::Put | Method::Patch)
    {
        head.push_str(&format!("Content-Length: {}\r\n", request.body.len()));
    }
    head.push_str("\r\n");

    let mut message = head.into_bytes();
    message.extend_from_slice(&request.body);
    message
}

/// Decode a request from bytes
pub fn decode_request(bytes: &[u8], max_body: usize) -> Result<Request> {
    read_request(&mut Cursor::new(bytes), max_body)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Any Content-Length header on the response is replaced by the real one.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        response.status.code(),
        response.status.reason()
    );
    push_headers(&mut head, &response.headers);
    head.push_str(&format!("Content-Length: {}\r\n\r\n", response.body.len()));

    let mut message = head.into_bytes();
    message.extend_from_slice(&response.body);
    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    read_response(&mut Cursor::new(bytes))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
///
/// Blocks until a complete request is received or an error occurs. A
/// stream that closes before the first byte yields an `UnexpectedEof` I/O
/// error, which callers treat as a normal disconnect.
pub fn read_request<R: BufRead>(reader: &mut R, max_body: usize) -> Result<Request> {
    // Tolerate a few stray CRLFs between keep-alive requests
    let mut request_line = read_line(reader)?;
    let mut skipped = 0;
    while request_line.is_empty() {
        skipped += 1;
        if skipped > MAX_LEADING_EMPTY_LINES {
            return Err(CatalogError::Protocol(
                "Too many empty lines before request line".to_string(),
            ));
        }
        request_line = read_line(reader)?;
    }

    let mut parts = request_line.splitn(3, ' ');
    let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version)) => (method, target, version),
        _ => {
            return Err(CatalogError::Protocol(format!(
                "Malformed request line: {request_line}"
            )))
        }
    };

    let method = Method::parse(method)?;
    let version = Version::parse(version)?;
    let (path, query) = parse_target(target)?;
    let headers = read_headers(reader)?;
    let body = read_body(reader, &headers, max_body)?;

    Ok(Request {
        method,
        path,
        query,
        version,
        headers,
        body,
    })
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
///
/// A response without Content-Length is treated as having an empty body.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let status_line = read_line(reader)?;

    let mut parts = status_line.splitn(3, ' ');
    let (version, code) = match (parts.next(), parts.next()) {
        (Some(version), Some(code)) => (version, code),
        _ => {
            return Err(CatalogError::Protocol(format!(
                "Malformed status line: {status_line}"
            )))
        }
    };
    Version::parse(version)?;

    let code: u16 = code
        .parse()
        .map_err(|_| CatalogError::Protocol(format!("Invalid status code: {code}")))?;
    let status = Status::from_code(code)
        .ok_or_else(|| CatalogError::Protocol(format!("Unknown status code: {code}")))?;

    let headers = read_headers(reader)?;
    let body = read_body(reader, &headers, MAX_RESPONSE_BODY_SIZE)?;

    let headers = headers
        .into_iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("content-length"))
        .collect();

    Ok(Response {
        status,
        headers,
        body,
    })
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Internal helpers
// =============================================================================

fn push_headers(head: &mut String, headers: &[(String, String)]) {
    for (name, value) in headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
}

/// Read one CRLF- (or LF-) terminated line without its terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut buf = Vec::new();
    let limit = MAX_LINE_LENGTH as u64 + 1;
    let read = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    if buf.last() != Some(&b'\n') {
        if buf.len() > MAX_LINE_LENGTH {
            return Err(CatalogError::Protocol(format!(
                "Line exceeds {MAX_LINE_LENGTH} bytes"
            )));
        }
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }

    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    String::from_utf8(buf)
        .map_err(|_| CatalogError::Protocol("Line is not valid UTF-8".to_string()))
}

/// Read header fields up to and including the blank line
fn read_headers<R: BufRead>(reader: &mut R) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::new();

    loop {
        let line = read_line(reader)?;
        if line.is_empty() {
            return Ok(headers);
        }
        if headers.len() == MAX_HEADERS {
            return Err(CatalogError::Protocol(format!(
                "More than {MAX_HEADERS} header fields"
            )));
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| CatalogError::Protocol(format!("Malformed header: {line}")))?;
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(CatalogError::Protocol(format!(
                "Malformed header name: {name:?}"
            )));
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }
}

/// The declared body length
///
/// Repeated fields and comma-separated lists are accepted only when every
/// value is the same number.
fn content_length(headers: &[(String, String)]) -> Result<Option<usize>> {
    let values = headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .flat_map(|(_, value)| value.split(','));

    let mut length = None;
    for raw in values {
        let raw = raw.trim();
        let parsed = raw
            .parse::<usize>()
            .map_err(|_| CatalogError::Protocol(format!("Invalid Content-Length: {raw}")))?;
        match length {
            Some(existing) if existing != parsed => {
                return Err(CatalogError::Protocol(format!(
                    "Conflicting Content-Length values: {existing} and {parsed}"
                )))
            }
            _ => length = Some(parsed),
        }
    }
    Ok(length)
}

/// Read a Content-Length framed body
fn read_body<R: Read>(
    reader: &mut R,
    headers: &[(String, String)],
    max_body: usize,
) -> Result<Vec<u8>> {
    let header = |wanted: &str| {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, value)| value.as_str())
    };

    if header("Transfer-Encoding").is_some() {
        return Err(CatalogError::Protocol(
            "Transfer-Encoding is not supported; send Content-Length".to_string(),
        ));
    }

    let length = match content_length(headers)? {
        Some(length) => length,
        None => return Ok(Vec::new()),
    };

    // Validate body length
    if length > max_body {
        return Err(CatalogError::PayloadTooLarge {
            size: length,
            max: max_body,
        });
    }

    let mut body = vec![0u8; length];
    if length > 0 {
        reader.read_exact(&mut body)?;
    }
    Ok(body)
}
