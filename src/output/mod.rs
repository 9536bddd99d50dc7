//! Output module for persisting crawl results
//!
//! This module handles:
//! - The sink lifecycle shared by both persistence targets
//! - The SQLite structured sink and the CSV export sink
//! - Statistics over what has been stored

mod csv_export;
mod sqlite_output;
pub mod stats;
mod traits;

pub use csv_export::{ExportSink, EXPORT_HEADER};
pub use sqlite_output::StructuredSink;
pub use stats::{load_statistics, print_statistics, BookStatistics};
pub use traits::{RecordSink, SinkError, SinkResult};

use crate::config::OutputConfig;
use crate::ShelfError;
use std::path::Path;

/// Opens both sinks named by the output configuration
///
/// The structured sink is opened first; if the export sink then fails to
/// open, the structured sink is closed before the error is returned.
pub fn open_sinks(config: &OutputConfig) -> Result<(StructuredSink, ExportSink), ShelfError> {
    let mut structured = StructuredSink::open(Path::new(&config.database_path))?;

    match ExportSink::open(Path::new(&config.export_path)) {
        Ok(export) => Ok((structured, export)),
        Err(e) => {
            if let Err(close_err) = structured.close() {
                tracing::warn!("Failed to close structured sink: {}", close_err);
            }
            Err(e.into())
        }
    }
}
