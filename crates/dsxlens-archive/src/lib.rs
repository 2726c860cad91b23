//! Archive and batch collaborators
//!
//! This crate handles:
//! - Reading `.dsx` documents out of zip archives
//! - Running the extractor over many documents with per-document isolation
//! - Packaging extracted jobs back into a zip of JSON files

pub mod error;
pub mod archive;
pub mod batch;
pub mod export;

pub use error::{ArchiveError, BatchError};
pub use archive::{read_archive, read_archive_file, ArchiveContents, SourceDocument};
pub use batch::{BatchOutcome, BatchProcessor, ProcessedJob};
pub use export::{entry_names, export_archive, write_archive};
