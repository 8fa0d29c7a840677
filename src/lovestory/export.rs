//! Backup export: the full gallery as a ZIP archive.
//!
//! The archive holds one `metadata/items.json` manifest (every media
//! record, pretty-printed) and one `media/{id}-{filename}` entry per item
//! whose payload is still readable. There is no import path; the archive
//! is a take-it-elsewhere copy, not a sync format.

use crate::error::{LoveStoryError, Result};
use crate::media;
use crate::store::StoreBackend;
use chrono::NaiveDate;
use std::io::{Seek, Write};
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Metadata records written into the manifest.
    pub items: usize,
    /// Payload entries written.
    pub payloads: usize,
    /// Items whose payload could not be read and was left out.
    pub skipped: usize,
}

/// Download name for a backup taken on the given day.
pub fn backup_filename(date: NaiveDate) -> String {
    format!("love-story-backup-{}.zip", date.format("%Y-%m-%d"))
}

/// Write the archive to `writer`. Items with unreadable payloads are
/// skipped and counted; they never abort the export.
pub fn export_backup<S, W>(store: &S, writer: W) -> Result<ExportSummary>
where
    S: StoreBackend,
    W: Write + Seek,
{
    let items = media::get_all_media_meta(store);

    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default();

    let manifest =
        serde_json::to_string_pretty(&items).map_err(LoveStoryError::Serialization)?;
    zip.start_file("metadata/items.json", options)?;
    zip.write_all(manifest.as_bytes()).map_err(LoveStoryError::Io)?;

    let mut summary = ExportSummary {
        items: items.len(),
        ..ExportSummary::default()
    };

    for item in &items {
        match media::get_media_bytes(store, item.id) {
            Some(bytes) => {
                zip.start_file(format!("media/{}-{}", item.id, item.filename), options)?;
                zip.write_all(&bytes).map_err(LoveStoryError::Io)?;
                summary.payloads += 1;
            }
            None => {
                warn!(id = %item.id, filename = %item.filename,
                    "export: payload unreadable; leaving it out of the archive");
                summary.skipped += 1;
            }
        }
    }

    zip.finish()?;
    Ok(summary)
}
