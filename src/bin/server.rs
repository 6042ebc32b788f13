//! BookOrigins Server Binary
//!
//! Starts the HTTP server for BookOrigins.

use std::sync::Arc;

use bookorigins::network::Server;
use bookorigins::{Config, Engine};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// BookOrigins Server
#[derive(Parser, Debug)]
#[command(name = "bookorigins-server")]
#[command(about = "Book catalog service with reviews, chapters and search")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Maximum connections waiting for a worker
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Read timeout while a request arrives in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,

    /// Idle keep-alive timeout per connection in milliseconds
    #[arg(long, default_value = "5000")]
    keep_alive_ms: u64,

    /// Maximum request body size in KiB
    #[arg(long, default_value = "1024")]
    max_body_kb: usize,

    /// Start with an empty catalog instead of the sample books
    #[arg(long)]
    no_seed: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bookorigins=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("BookOrigins Server v{}", bookorigins::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .keep_alive_timeout_ms(args.keep_alive_ms)
        .max_body_bytes(args.max_body_kb * 1024)
        .seed_sample_data(!args.no_seed)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(2);
    }

    // Open engine
    let engine = match Engine::open(&config) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Engine initialized with {} books and {} reviews",
        engine.book_count(),
        engine.review_count()
    );

    // Start server
    let mut server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
