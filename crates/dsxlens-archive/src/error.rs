//! Acquisition-layer errors
//!
//! These are the only hard failures in the pipeline. Each one names the
//! archive entry or document it concerns.

use zip::result::ZipError;

/// Archive read/write errors
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to open archive: {0}")]
    Open(String),

    #[error("Failed to read entry '{entry}': {message}")]
    Entry { entry: String, message: String },

    #[error("Failed to serialize job '{job}': {message}")]
    Serialize { job: String, message: String },

    #[error("Failed to write archive: {0}")]
    Write(String),
}

impl ArchiveError {
    /// Archive entry the error is about, if any
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::Entry { entry, .. } => Some(entry),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Io(err.to_string())
    }
}

impl From<ZipError> for ArchiveError {
    fn from(err: ZipError) -> Self {
        ArchiveError::Write(err.to_string())
    }
}

/// A single document that could not be processed in a batch
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to read '{document}': {message}")]
    Read { document: String, message: String },

    #[error("Failed to open archive '{document}': {message}")]
    Archive { document: String, message: String },

    #[error("Extraction aborted for '{document}': {message}")]
    Extraction { document: String, message: String },
}

impl BatchError {
    /// Name of the document or archive that failed
    pub fn document(&self) -> &str {
        match self {
            Self::Read { document, .. }
            | Self::Archive { document, .. }
            | Self::Extraction { document, .. } => document,
        }
    }
}
