//! Configuration for BookOrigins
//!
//! Centralized configuration with sensible defaults.

use crate::error::{CatalogError, Result};

/// Main configuration for a BookOrigins instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Catalog Configuration
    // -------------------------------------------------------------------------
    /// Load the sample books and reviews when the engine is opened
    pub seed_sample_data: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of worker threads serving connections
    pub worker_threads: usize,

    /// Max connections waiting for a worker before new ones are refused
    pub max_connections: usize,

    /// Read timeout while a request is arriving (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// How long a keep-alive connection may sit idle between requests
    /// (milliseconds). An idle connection is closed sooner when other
    /// connections are waiting for a worker.
    pub keep_alive_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    /// Largest accepted request body (bytes)
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_sample_data: true,
            listen_addr: "127.0.0.1:5000".to_string(),
            worker_threads: 4,
            max_connections: 1024,
            read_timeout_ms: 5000,
            keep_alive_timeout_ms: 5000,
            write_timeout_ms: 5000,
            max_body_bytes: 1024 * 1024, // 1 MiB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(CatalogError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(CatalogError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.keep_alive_timeout_ms == 0 {
            return Err(CatalogError::Config(
                "keep_alive_timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.listen_addr.trim().is_empty() {
            return Err(CatalogError::Config("listen_addr is empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Enable or disable loading the sample catalog
    pub fn seed_sample_data(mut self, seed: bool) -> Self {
        self.config.seed_sample_data = seed;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the idle keep-alive timeout (in milliseconds)
    pub fn keep_alive_timeout_ms(mut self, ms: u64) -> Self {
        self.config.keep_alive_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum request body size (in bytes)
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
