//! CSV export sink
//!
//! Writes a fixed header row on open, then one row per record in the same
//! column order: `Title,Price,Availability,Rating`.

use crate::item::CanonicalRecord;
use crate::output::traits::{RecordSink, SinkError, SinkResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names of the export file, in order
pub const EXPORT_HEADER: [&str; 4] = ["Title", "Price", "Availability", "Rating"];

/// Export sink appending CSV rows
pub struct ExportSink<W: Write = File> {
    writer: Option<csv::Writer<W>>,
}

impl ExportSink<File> {
    /// Creates or truncates the export file and writes the header row
    pub fn open(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let sink = Self::from_writer(file)?;
        tracing::debug!("Export sink opened at {}", path.display());
        Ok(sink)
    }
}

impl<W: Write> ExportSink<W> {
    /// Wraps any writer and writes the header row to it
    pub fn from_writer(inner: W) -> SinkResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(EXPORT_HEADER)?;
        writer.flush()?;
        Ok(Self {
            writer: Some(writer),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

impl<W: Write + Send> RecordSink for ExportSink<W> {
    fn name(&self) -> &'static str {
        "export"
    }

    fn write(&mut self, record: &CanonicalRecord) -> SinkResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(SinkError::Closed { sink: "export" })?;

        writer.serialize(record)?;
        // each row reaches the file before the next record is processed
        writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> SinkResult<()> {
        if let Some(writer) = self.writer.take() {
            writer
                .into_inner()
                .map_err(|e| SinkError::Write(e.error().to_string()))?
                .flush()?;
            tracing::debug!("Export sink closed");
        }
        Ok(())
    }
}
