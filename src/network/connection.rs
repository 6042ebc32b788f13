//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufRead, BufReader, BufWriter};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;

use crate::api::{error_response, Router};
use crate::error::{CatalogError, Result};
use crate::protocol::{read_request, write_response, Response};

/// Granularity of the idle wait between keep-alive requests
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Outcome of waiting for the next request on a kept-alive connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Idle {
    /// Request bytes are available
    Ready,
    /// Peer closed the connection
    Closed,
    /// Keep-alive timeout elapsed
    Expired,
    /// Other connections are queued; give the worker up
    Yielded,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Routes requests to the engine
    router: Router,

    /// Largest request body accepted
    max_body_bytes: usize,

    /// Timeout applied while a request is being read
    read_timeout: Option<Duration>,

    /// Longest idle gap allowed between requests
    keep_alive_timeout: Duration,

    /// Connections waiting for a worker, if served from a pool
    backlog: Option<Receiver<TcpStream>>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on cloned read/write handles
    pub fn new(stream: TcpStream, router: Router, max_body_bytes: usize) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            router,
            max_body_bytes,
            read_timeout: None,
            keep_alive_timeout: Duration::from_millis(5000),
            backlog: None,
            peer_addr,
        })
    }

    /// Watch a worker pool's queue; while it is non-empty this connection
    /// closes instead of idling between requests
    pub fn with_backlog(mut self, backlog: Receiver<TcpStream>) -> Self {
        self.backlog = Some(backlog);
        self
    }

    /// Set the idle keep-alive timeout
    pub fn set_keep_alive_timeout(&mut self, ms: u64) {
        self.keep_alive_timeout = Duration::from_millis(ms);
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            self.read_timeout = Some(Duration::from_millis(read_ms));
            read_stream.set_read_timeout(self.read_timeout)?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Serves requests in a loop. Returns when the client disconnects, a
    /// timeout fires, a request asks to close, other connections need the
    /// worker, or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            match self.await_request()? {
                Idle::Ready => {}
                Idle::Closed => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Idle::Expired => {
                    tracing::debug!("Keep-alive timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Idle::Yielded => {
                    tracing::debug!(
                        "Closing idle connection {} for queued clients",
                        self.peer_addr
                    );
                    return Ok(());
                }
            }

            // Read next request
            let request = match read_request(&mut self.reader, self.max_body_bytes) {
                Ok(request) => request,
                Err(CatalogError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(CatalogError::Io(ref e))
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    // Idle keep-alive connection (Windows reports TimedOut)
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e @ (CatalogError::Protocol(_) | CatalogError::PayloadTooLarge { .. })) => {
                    tracing::warn!("Rejecting request from {}: {}", self.peer_addr, e);
                    let response = error_response(&e, "Malformed request", "Malformed request")
                        .with_header("Connection", "close");
                    // Best effort: the client may already be gone
                    let _ = self.send_response(&response);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            tracing::trace!(
                "Received {} {} from {}",
                request.method,
                request.path,
                self.peer_addr
            );

            let close = request.wants_close() || self.backlog_waiting();
            let mut response = self.router.handle(&request);
            if close {
                response = response.with_header("Connection", "close");
            }

            tracing::debug!(
                "{} {} -> {} ({})",
                request.method,
                request.path,
                response.status.code(),
                self.peer_addr
            );

            // Send response
            if let Err(e) = self.send_response(&response) {
                // If the client disconnected before we could send the response,
                // log and exit gracefully rather than treating it as a server error.
                if let CatalogError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind())
                        || io_err.kind() == std::io::ErrorKind::BrokenPipe
                    {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }

            if close {
                tracing::debug!("Closing connection to {} on request", self.peer_addr);
                return Ok(());
            }
        }
    }

    /// Wait until the next request starts arriving
    ///
    /// Polls in short slices so a queued connection is noticed while this
    /// one is idle. The request read timeout is restored afterwards.
    fn await_request(&mut self) -> Result<Idle> {
        // Pipelined bytes already buffered
        if !self.reader.buffer().is_empty() {
            return Ok(Idle::Ready);
        }

        self.reader
            .get_ref()
            .set_read_timeout(Some(IDLE_POLL_INTERVAL))?;
        let started = Instant::now();

        let outcome = loop {
            let filled = self.reader.fill_buf().map(|buf| !buf.is_empty());
            match filled {
                Ok(true) => break Idle::Ready,
                Ok(false) => break Idle::Closed,
                Err(ref e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    if self.backlog_waiting() {
                        break Idle::Yielded;
                    }
                    if started.elapsed() >= self.keep_alive_timeout {
                        break Idle::Expired;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(ref e) if is_disconnect(e.kind()) => break Idle::Closed,
                Err(e) => return Err(e.into()),
            }
        };

        self.reader.get_ref().set_read_timeout(self.read_timeout)?;
        Ok(outcome)
    }

    /// Whether accepted connections are waiting for a worker
    fn backlog_waiting(&self) -> bool {
        self.backlog
            .as_ref()
            .is_some_and(|backlog| !backlog.is_empty())
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.writer, response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Peer went away: clean EOF, reset or abort
fn is_disconnect(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
    )
}
