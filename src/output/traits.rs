//! Sink trait and error types
//!
//! A sink is a durable write target with an open/write/close lifecycle.
//! Opening happens in each sink's constructor; `close` releases the
//! underlying resource and is safe to call more than once.

use crate::item::CanonicalRecord;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur while writing to a sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{sink} sink is already closed")]
    Closed { sink: &'static str },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write output: {0}")]
    Write(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// A durable destination for canonical records
///
/// Only the crawl controller calls these methods, one record at a time and
/// in extraction order.
pub trait RecordSink: Send {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Persists one record
    fn write(&mut self, record: &CanonicalRecord) -> SinkResult<()>;

    /// Flushes and releases the underlying resource
    ///
    /// Calling `close` on an already closed sink is a no-op.
    fn close(&mut self) -> SinkResult<()>;
}
