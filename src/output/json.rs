//! JSON export of crawled events

use crate::model::StockCalendarEvent;
use crate::CrawlerError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes events as a pretty-printed JSON array to `output_path`
pub fn write_events_json(
    events: &[StockCalendarEvent],
    output_path: &Path,
) -> Result<(), CrawlerError> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, events)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Wrote {} events to {}", events.len(), output_path.display());
    Ok(())
}
