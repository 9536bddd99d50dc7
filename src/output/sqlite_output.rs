//! SQLite-backed structured sink
//!
//! Inserts one `books` row per record into the structured store.

use crate::item::CanonicalRecord;
use crate::output::traits::{RecordSink, SinkError, SinkResult};
use crate::storage::{SqliteStorage, Storage};
use crate::ShelfError;
use std::path::Path;

/// Structured sink writing into the `books` table
pub struct StructuredSink {
    storage: Option<SqliteStorage>,
}

impl StructuredSink {
    /// Opens the database file and ensures the `books` table exists
    pub fn open(path: &Path) -> Result<Self, ShelfError> {
        let storage = SqliteStorage::new(path)?;
        tracing::debug!("Structured sink opened at {}", path.display());
        Ok(Self::from_storage(storage))
    }

    /// Wraps an already opened storage backend
    pub fn from_storage(storage: SqliteStorage) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.storage.is_none()
    }
}

impl RecordSink for StructuredSink {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn write(&mut self, record: &CanonicalRecord) -> SinkResult<()> {
        let storage = self
            .storage
            .as_mut()
            .ok_or(SinkError::Closed { sink: "structured" })?;

        let id = storage.insert_book(record)?;
        tracing::trace!("Inserted book {} as id {}", record.title, id);
        Ok(())
    }

    fn close(&mut self) -> SinkResult<()> {
        if let Some(storage) = self.storage.take() {
            storage.close()?;
            tracing::debug!("Structured sink closed");
        }
        Ok(())
    }
}
