//! Entity table implementation
//!
//! BTreeMap-based table with RwLock for concurrency.

use std::collections::btree_map::Values;
use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::{CatalogError, Result};

/// Rows plus the next id, guarded together so id assignment and insert
/// can never interleave with another writer.
struct Rows<T> {
    data: BTreeMap<u64, T>,
    next_id: u64,
}

/// In-memory table for one entity type
///
/// Ids start at 1, increase by one per insert and are never reused.
pub struct EntityTable<T> {
    rows: RwLock<Rows<T>>,
}

impl<T: Clone> EntityTable<T> {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Rows {
                data: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Insert a row built from its freshly assigned id
    pub fn insert_with(&self, build: impl FnOnce(u64) -> T) -> Result<T> {
        self.insert_checked(|_| Ok(()), build)
    }

    /// Insert a row after `check` accepts the current contents
    ///
    /// The check and the insert share one write guard. A rejected insert
    /// consumes no id.
    pub fn insert_checked(
        &self,
        check: impl FnOnce(Values<'_, u64, T>) -> Result<()>,
        build: impl FnOnce(u64) -> T,
    ) -> Result<T> {
        let mut rows = self.rows.write();

        check(rows.data.values())?;

        let id = rows.next_id;
        rows.next_id = id
            .checked_add(1)
            .ok_or_else(|| CatalogError::Internal("identifier space exhausted".to_string()))?;

        let row = build(id);
        rows.data.insert(id, row.clone());
        Ok(row)
    }

    /// Get a copy of the row with this id (read lock)
    pub fn get(&self, id: u64) -> Option<T> {
        self.rows.read().data.get(&id).cloned()
    }

    /// Mutate the row with this id in place (write lock)
    ///
    /// Returns the updated row, or `None` without side effects if absent.
    pub fn update(&self, id: u64, change: impl FnOnce(&mut T)) -> Option<T> {
        let mut rows = self.rows.write();
        let row = rows.data.get_mut(&id)?;
        change(row);
        Some(row.clone())
    }

    /// First row in id order matching `predicate`
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.rows
            .read()
            .data
            .values()
            .find(|row| predicate(row))
            .cloned()
    }

    /// All rows in id order matching `predicate`
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        self.rows
            .read()
            .data
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.read().data.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.read().data.is_empty()
    }

    /// Id the next insert will receive
    pub fn next_id(&self) -> u64 {
        self.rows.read().next_id
    }
}

impl<T: Clone> Default for EntityTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
