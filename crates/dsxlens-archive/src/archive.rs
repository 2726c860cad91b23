//! Reading DSX documents out of zip archives

use std::io::{Cursor, Read};
use std::path::Path;

use serde::Serialize;
use zip::ZipArchive;

use crate::error::ArchiveError;

/// File extension of DSX exports
pub const DSX_EXTENSION: &str = "dsx";

/// One named text document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDocument {
    /// File or entry name the text came from
    pub name: String,

    pub content: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Decode raw bytes, replacing invalid UTF-8 sequences
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(name, String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Documents recovered from one archive, plus entries that failed
#[derive(Debug, Default)]
pub struct ArchiveContents {
    pub documents: Vec<SourceDocument>,
    pub failures: Vec<ArchiveError>,
}

/// Whether a file name carries the DSX extension (case-insensitive)
pub fn is_dsx_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(DSX_EXTENSION))
        .unwrap_or(false)
}

/// Read every `.dsx` entry of a zip archive held in memory
///
/// Only an unreadable archive is an error; a failing entry is recorded in
/// `failures` and the remaining entries are still returned.
pub fn read_archive(bytes: &[u8]) -> Result<ArchiveContents, ArchiveError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ArchiveError::Open(e.to_string()))?;

    let mut contents = ArchiveContents::default();

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable archive entry");
                contents.failures.push(ArchiveError::Entry {
                    entry: format!("#{}", index),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let name = entry.name().to_string();
        if entry.is_dir() || !is_dsx_name(&name) {
            continue;
        }

        let mut bytes = Vec::new();
        match entry.read_to_end(&mut bytes) {
            Ok(_) => contents.documents.push(SourceDocument::from_bytes(name, &bytes)),
            Err(e) => {
                tracing::warn!(entry = %name, error = %e, "failed to decompress entry");
                contents.failures.push(ArchiveError::Entry {
                    entry: name,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        documents = contents.documents.len(),
        failures = contents.failures.len(),
        "read archive"
    );
    Ok(contents)
}

/// Read a zip archive from disk
pub fn read_archive_file(path: &Path) -> Result<ArchiveContents, ArchiveError> {
    let bytes = std::fs::read(path)?;
    read_archive(&bytes)
}
