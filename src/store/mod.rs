//! Store Module
//!
//! In-memory tables holding one entity type each.
//!
//! ## Responsibilities
//! - Own the rows of one entity type
//! - Assign identifiers atomically with the insert
//! - Single-writer/multi-reader access pattern
//! - Iterate rows in identifier order
//!
//! ## Data Structure Choice
//! BTreeMap keyed by id, wrapped in RwLock:
//! - Ids are handed out in insertion order, so id order is insertion order
//! - Every read-modify-write runs under one write guard
//! - Rows are cloned out; callers never hold a guard

mod table;

pub use table::EntityTable;
