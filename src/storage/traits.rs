//! Storage traits and error types
//!
//! This module defines the trait interface for the structured store and
//! associated error types.

use crate::item::CanonicalRecord;
use crate::storage::{BookRow, PriceStats};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for structured store implementations
pub trait Storage {
    // ===== Writes =====

    /// Inserts one record and returns its generated id
    fn insert_book(&mut self, record: &CanonicalRecord) -> StorageResult<i64>;

    // ===== Queries =====

    /// Counts all stored books
    fn count_books(&self) -> StorageResult<u64>;

    /// Returns every stored book in insertion order
    fn get_books(&self) -> StorageResult<Vec<BookRow>>;

    /// Gets book count per rating (rating -> count)
    fn rating_breakdown(&self) -> StorageResult<BTreeMap<u8, u64>>;

    /// Gets min/max/average over priced books and the unpriced count
    fn price_stats(&self) -> StorageResult<PriceStats>;
}
