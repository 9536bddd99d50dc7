//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::item::CanonicalRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{BookRow, PriceStats};
use crate::ShelfError;
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use std::collections::BTreeMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and ensures the schema exists
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(ShelfError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ShelfError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA synchronous = FULL;")?;
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Opens an existing database file without creating it
    ///
    /// The connection is read-only; used by the statistics report.
    pub fn open_existing(path: &Path) -> Result<Self, ShelfError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, ShelfError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Closes the underlying connection
    pub fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, e)| StorageError::from(e))
    }
}

/// Promotes SQLite constraint failures to their own error kind
fn classify(err: rusqlite::Error) -> StorageError {
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => StorageError::ConstraintViolation(err.to_string()),
        _ => StorageError::Sqlite(err),
    }
}

impl Storage for SqliteStorage {
    fn insert_book(&mut self, record: &CanonicalRecord) -> StorageResult<i64> {
        self.conn
            .execute(
                "INSERT INTO books (title, price, availability, rating) VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.title,
                    record.price,
                    record.availability,
                    record.rating
                ],
            )
            .map_err(classify)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn get_books(&self) -> StorageResult<Vec<BookRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, price, availability, rating FROM books ORDER BY id")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(BookRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    price: row.get(2)?,
                    availability: row.get(3)?,
                    rating: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn rating_breakdown(&self) -> StorageResult<BTreeMap<u8, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(rating, 0), COUNT(*) FROM books GROUP BY COALESCE(rating, 0)",
        )?;

        let mut breakdown = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (rating, count) = row?;
            breakdown.insert(rating, count as u64);
        }

        Ok(breakdown)
    }

    fn price_stats(&self) -> StorageResult<PriceStats> {
        let stats = self.conn.query_row(
            "SELECT MIN(price), MAX(price), AVG(price),
                    COUNT(price), SUM(CASE WHEN price IS NULL THEN 1 ELSE 0 END)
             FROM books",
            [],
            |row| {
                Ok(PriceStats {
                    min: row.get(0)?,
                    max: row.get(1)?,
                    average: row.get(2)?,
                    priced: row.get::<_, i64>(3)? as u64,
                    unpriced: row.get::<_, Option<i64>>(4)?.unwrap_or(0) as u64,
                })
            },
        )?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, price: Option<f64>, rating: u8) -> CanonicalRecord {
        CanonicalRecord {
            title: title.to_string(),
            price,
            availability: "In stock".to_string(),
            rating,
        }
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let first = storage.insert_book(&record("A", Some(1.0), 1)).unwrap();
        let second = storage.insert_book(&record("B", Some(2.0), 2)).unwrap();

        assert!(second > first);
        assert_eq!(storage.count_books().unwrap(), 2);
    }

    #[test]
    fn test_get_books_roundtrip() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_book(&record("Tipping the Velvet", Some(53.74), 1))
            .unwrap();
        storage.insert_book(&record("Soumission", None, 0)).unwrap();

        let books = storage.get_books().unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "Tipping the Velvet");
        assert_eq!(books[0].price, Some(53.74));
        assert_eq!(books[0].rating, Some(1));
        assert_eq!(books[1].title, "Soumission");
        assert_eq!(books[1].price, None);
    }

    #[test]
    fn test_empty_store() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(storage.count_books().unwrap(), 0);
        assert!(storage.rating_breakdown().unwrap().is_empty());

        let stats = storage.price_stats().unwrap();
        assert_eq!(stats.priced, 0);
        assert_eq!(stats.unpriced, 0);
        assert_eq!(stats.average, None);
    }

    #[test]
    fn test_rating_breakdown() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        for rating in [3, 3, 5, 0] {
            storage.insert_book(&record("x", None, rating)).unwrap();
        }

        let breakdown = storage.rating_breakdown().unwrap();
        assert_eq!(breakdown.get(&3), Some(&2));
        assert_eq!(breakdown.get(&5), Some(&1));
        assert_eq!(breakdown.get(&0), Some(&1));
        assert_eq!(breakdown.get(&1), None);
    }

    #[test]
    fn test_price_stats() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.insert_book(&record("a", Some(10.0), 1)).unwrap();
        storage.insert_book(&record("b", Some(30.0), 1)).unwrap();
        storage.insert_book(&record("c", None, 1)).unwrap();

        let stats = storage.price_stats().unwrap();
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(30.0));
        assert_eq!(stats.average, Some(20.0));
        assert_eq!(stats.priced, 2);
        assert_eq!(stats.unpriced, 1);
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("books.db");

        {
            let mut storage = SqliteStorage::new(&path).unwrap();
            storage.insert_book(&record("kept", Some(5.0), 4)).unwrap();
            storage.close().unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(storage.count_books().unwrap(), 1);
    }
}
