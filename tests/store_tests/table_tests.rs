//! EntityTable Tests
//!
//! Tests verify:
//! - Id assignment starting at 1
//! - Checked inserts that consume no id when rejected
//! - In-place updates
//! - Id-ordered iteration for find / filter
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use bookorigins::store::EntityTable;
use bookorigins::CatalogError;

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: u64,
    name: String,
}

fn row(id: u64, name: &str) -> Row {
    Row {
        id,
        name: name.to_string(),
    }
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_table_is_empty() {
    let table: EntityTable<Row> = EntityTable::new();

    assert_eq!(table.len(), 0);
    assert!(table.is_empty());
    assert_eq!(table.next_id(), 1);
}

#[test]
fn test_insert_assigns_sequential_ids() {
    let table = EntityTable::new();

    let first = table.insert_with(|id| row(id, "first")).unwrap();
    let second = table.insert_with(|id| row(id, "second")).unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(table.len(), 2);
    assert_eq!(table.next_id(), 3);
}

#[test]
fn test_get_returns_copy() {
    let table = EntityTable::new();
    table.insert_with(|id| row(id, "kept")).unwrap();

    let mut copy = table.get(1).unwrap();
    copy.name = "changed".to_string();

    assert_eq!(table.get(1), Some(row(1, "kept")));
}

#[test]
fn test_get_nonexistent_id() {
    let table: EntityTable<Row> = EntityTable::new();

    assert_eq!(table.get(1), None);
    assert_eq!(table.get(0), None);
}

// =============================================================================
// Checked Insert Tests
// =============================================================================

#[test]
fn test_insert_checked_sees_existing_rows() {
    let table = EntityTable::new();
    table.insert_with(|id| row(id, "taken")).unwrap();

    let result = table.insert_checked(
        |mut rows| {
            if rows.any(|r| r.name == "taken") {
                return Err(CatalogError::DuplicateKey {
                    field: "name",
                    value: "taken".to_string(),
                });
            }
            Ok(())
        },
        |id| row(id, "taken"),
    );

    assert!(matches!(result, Err(CatalogError::DuplicateKey { .. })));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_rejected_insert_consumes_no_id() {
    let table = EntityTable::new();

    let rejected = table.insert_checked(
        |_| Err(CatalogError::InvalidInput("no".to_string())),
        |id| row(id, "never"),
    );
    assert!(rejected.is_err());

    let accepted = table.insert_with(|id| row(id, "first")).unwrap();
    assert_eq!(accepted.id, 1);
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_mutates_in_place() {
    let table = EntityTable::new();
    table.insert_with(|id| row(id, "before")).unwrap();

    let updated = table.update(1, |r| r.name = "after".to_string());

    assert_eq!(updated, Some(row(1, "after")));
    assert_eq!(table.get(1), Some(row(1, "after")));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_update_missing_row_is_noop() {
    let table: EntityTable<Row> = EntityTable::new();
    let mut called = false;

    let updated = table.update(7, |_| called = true);

    assert_eq!(updated, None);
    assert!(!called);
    assert!(table.is_empty());
    assert_eq!(table.next_id(), 1);
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_filter_returns_id_order() {
    let table = EntityTable::new();
    for name in ["c", "a", "b", "a"] {
        table.insert_with(|id| row(id, name)).unwrap();
    }

    let all: Vec<u64> = table.filter(|_| true).iter().map(|r| r.id).collect();
    assert_eq!(all, vec![1, 2, 3, 4]);

    let a_rows: Vec<u64> = table.filter(|r| r.name == "a").iter().map(|r| r.id).collect();
    assert_eq!(a_rows, vec![2, 4]);
}

#[test]
fn test_find_returns_first_match() {
    let table = EntityTable::new();
    for name in ["x", "y", "y"] {
        table.insert_with(|id| row(id, name)).unwrap();
    }

    assert_eq!(table.find(|r| r.name == "y").map(|r| r.id), Some(2));
    assert_eq!(table.find(|r| r.name == "z"), None);
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_inserts() {
    let table = Arc::new(EntityTable::new());
    let mut handles = vec![];

    for t in 0..4 {
        let table_clone = Arc::clone(&table);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                table_clone
                    .insert_with(|id| row(id, &format!("t{t}-{i}")))
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(table.len(), 400);
    assert_eq!(table.next_id(), 401);
    // The stored id always matches the key it was inserted under
    for r in table.filter(|_| true) {
        assert_eq!(table.get(r.id), Some(r));
    }
}

#[test]
fn test_concurrent_read_write() {
    let table = Arc::new(EntityTable::new());
    table.insert_with(|id| row(id, "0")).unwrap();

    let writer_table = Arc::clone(&table);
    let writer = thread::spawn(move || {
        for i in 1..=200 {
            writer_table.update(1, |r| r.name = i.to_string());
        }
    });

    let mut readers = vec![];
    for _ in 0..3 {
        let reader_table = Arc::clone(&table);
        readers.push(thread::spawn(move || {
            for _ in 0..200 {
                let current = reader_table.get(1).unwrap();
                assert!(current.name.parse::<u32>().unwrap() <= 200);
            }
        }));
    }

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(table.get(1).unwrap().name, "200");
}
