//! Storage module for the structured store
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Book record insertion
//! - Summary queries used by the statistics report

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::ShelfError;
use std::path::Path;

/// Opens an existing storage database for reading
///
/// A missing file is an error; nothing is created on disk.
pub fn open_storage(path: &Path) -> Result<SqliteStorage, ShelfError> {
    if !path.is_file() {
        return Err(ShelfError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no database at {}", path.display()),
        )));
    }
    SqliteStorage::open_existing(path)
}

/// A book as stored in the database
#[derive(Debug, Clone, PartialEq)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub price: Option<f64>,
    pub availability: Option<String>,
    pub rating: Option<u8>,
}

/// Price figures over the stored books
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    /// Books with a price
    pub priced: u64,
    /// Books without a price
    pub unpriced: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::CanonicalRecord;

    #[test]
    fn test_open_storage_reads_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");

        let mut storage = SqliteStorage::new(&path).unwrap();
        storage
            .insert_book(&CanonicalRecord {
                title: "Stored".to_string(),
                price: Some(9.5),
                availability: "In stock".to_string(),
                rating: 4,
            })
            .unwrap();
        storage.close().unwrap();

        let storage = open_storage(&path).unwrap();
        assert_eq!(storage.count_books().unwrap(), 1);
    }

    #[test]
    fn test_open_storage_does_not_create_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo").join("bokos.db");

        assert!(matches!(open_storage(&path), Err(ShelfError::Io(_))));
        assert!(!path.exists());
        assert!(!dir.path().join("typo").exists());
    }
}
