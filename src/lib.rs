//! # BookOrigins
//!
//! An in-memory book catalog service with:
//! - Books, chapters, reviews and users held in per-entity tables
//! - Listing, genre filtering and search over published books
//! - Single-writer/multi-reader concurrency per table
//! - An HTTP/1.1 JSON API served by a thread-pooled TCP server
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (acceptor + worker pool)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  HTTP/1.1 (protocol)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    API Router                                │
//! │        (validation, status mapping, no business rules)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! │        (ids, server-owned fields, catalog queries)           │
//! └──────┬──────────────┬──────────────┬──────────────┬─────────┘
//!        ▼              ▼              ▼              ▼
//!    ┌───────┐      ┌───────┐     ┌──────────┐    ┌─────────┐
//!    │ users │      │ books │     │ chapters │    │ reviews │
//!    └───────┘      └───────┘     └──────────┘    └─────────┘
//!              EntityTable (RwLock<BTreeMap>)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod store;
pub mod draft;
pub mod engine;
pub mod seed;
pub mod protocol;
pub mod api;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CatalogError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of BookOrigins
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
