//! Per-tick metrics sinks.

use forage_core::{Result, TickRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Receives one record per tick
pub trait MetricsSink {
    fn record(&mut self, record: &TickRecord) -> Result<()>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes records as CSV rows under a header row
pub struct CsvDumper<W: Write> {
    writer: W,
}

impl CsvDumper<BufWriter<File>> {
    /// Create or truncate the file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        info!("Writing metrics to {}", path.display());
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvDumper<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(writer, "{}", TickRecord::FIELDS.join(","))?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricsSink for CsvDumper<W> {
    fn record(&mut self, record: &TickRecord) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{}",
            record.agents_left,
            record.eaten_agents,
            record.spawned_agents,
            record.max_agents_level
        )?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Discards every record
#[derive(Debug, Default)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn record(&mut self, _record: &TickRecord) -> Result<()> {
        Ok(())
    }
}
