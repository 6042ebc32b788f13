//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::api::Router;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{CatalogError, Result};
use crate::protocol::{write_response, Response, Status};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// HTTP server for BookOrigins
///
/// ## Threading
/// - One acceptor (the thread calling `run`) polls a non-blocking listener
/// - Accepted sockets go through a bounded channel to `worker_threads`
///   workers, one connection per worker at a time
/// - An idle keep-alive connection gives its worker up as soon as another
///   connection is queued
/// - A full channel means saturation: the socket gets a 503 and is closed
pub struct Server {
    config: Config,
    router: Router,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            router: Router::new(engine),
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind the listen address without serving yet
    ///
    /// Returns the bound address, which resolves port 0 to the real port.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.local_addr() {
            return Ok(addr);
        }

        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            CatalogError::Config(format!("cannot bind {}: {}", self.config.listen_addr, e))
        })?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Address the server is bound to, if bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Flag that stops `run` when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Start the server (blocking)
    ///
    /// Returns once shutdown is signalled and every worker has finished its
    /// current connection.
    pub fn run(&mut self) -> Result<()> {
        self.config.validate()?;
        let addr = self.bind()?;

        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| CatalogError::Internal("listener missing after bind".to_string()))?;
        listener.set_nonblocking(true)?;

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);

        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for index in 0..self.config.worker_threads {
            workers.push(self.spawn_worker(index, receiver.clone())?);
        }
        drop(receiver);

        tracing::info!(
            "Listening on {} with {} workers",
            addr,
            self.config.worker_threads
        );

        while !self.shutdown.load(Ordering::Acquire) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    // Some platforms hand out sockets inheriting non-blocking mode
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    match sender.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(stream)) => {
                            tracing::warn!("Connection queue full, refusing {}", peer);
                            refuse(stream);
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            tracing::error!("All workers exited; stopping acceptor");
                            break;
                        }
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Shutting down, waiting for workers");
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        Ok(())
    }

    fn spawn_worker(&self, index: usize, receiver: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let router = self.router.clone();
        let config = self.config.clone();

        let handle = thread::Builder::new()
            .name(format!("bookorigins-worker-{index}"))
            .spawn(move || {
                for stream in receiver.iter() {
                    serve(stream, &router, &config, &receiver);
                }
            })?;
        Ok(handle)
    }
}

/// Serve one connection until it ends or the queue needs this worker
fn serve(stream: TcpStream, router: &Router, config: &Config, backlog: &Receiver<TcpStream>) {
    let mut connection = match Connection::new(stream, router.clone(), config.max_body_bytes) {
        Ok(connection) => connection.with_backlog(backlog.clone()),
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return;
    }
    connection.set_keep_alive_timeout(config.keep_alive_timeout_ms);

    if let Err(e) = connection.handle() {
        tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
    }
}

/// Answer a connection we have no capacity for
fn refuse(mut stream: TcpStream) {
    let response = Response::message(Status::ServiceUnavailable, "Server is busy, retry later")
        .with_header("Connection", "close");
    // Best effort: the socket is dropped either way
    let _ = write_response(&mut stream, &response);
}
