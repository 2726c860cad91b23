//! Batch extraction
//!
//! Runs the extractor once per document. A document that cannot be read, or
//! whose extraction aborts, is reported as a `BatchError` carrying its name;
//! every other document still produces a result.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use dsxlens_core::{Config, JobInfo, ValidationReport};
use dsxlens_engine::{DsxExtractor, Validator};
use serde::Serialize;
use walkdir::WalkDir;

use crate::archive::{is_dsx_name, read_archive_file, SourceDocument};
use crate::error::BatchError;

/// One extracted job and the document it came from
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedJob {
    pub source_name: String,
    pub job: JobInfo,
    pub validation: ValidationReport,
}

/// Results and failures of a batch run
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<ProcessedJob>,
    pub failures: Vec<BatchError>,
}

impl BatchOutcome {
    /// Fold another outcome into this one
    pub fn merge(&mut self, other: BatchOutcome) {
        self.results.extend(other.results);
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs extraction over many documents
pub struct BatchProcessor {
    extractor: DsxExtractor,
    estimate_tokens: bool,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl BatchProcessor {
    pub fn new(config: Config) -> Self {
        Self {
            extractor: DsxExtractor::new(config),
            estimate_tokens: false,
        }
    }

    /// Request token estimates for every job
    pub fn with_estimate(mut self, estimate_tokens: bool) -> Self {
        self.estimate_tokens = estimate_tokens;
        self
    }

    /// Extract every document
    pub fn process(&self, documents: impl IntoIterator<Item = SourceDocument>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for document in documents {
            match self.process_one(&document) {
                Ok(processed) => outcome.results.push(processed),
                Err(err) => {
                    tracing::warn!(document = %document.name, error = %err, "document failed");
                    outcome.failures.push(err);
                }
            }
        }

        tracing::info!(
            processed = outcome.results.len(),
            failed = outcome.failures.len(),
            "batch complete"
        );
        outcome
    }

    /// Extract and validate one document, isolating any panic
    pub fn process_one(&self, document: &SourceDocument) -> Result<ProcessedJob, BatchError> {
        let run = AssertUnwindSafe(|| {
            let job = self.extractor.extract(&document.content, self.estimate_tokens);
            let validation = Validator::validate(&job);
            (job, validation)
        });

        let (job, validation) = panic::catch_unwind(run).map_err(|payload| BatchError::Extraction {
            document: document.name.clone(),
            message: panic_message(payload.as_ref()),
        })?;

        Ok(ProcessedJob {
            source_name: document.name.clone(),
            job,
            validation,
        })
    }

    /// Process a directory tree, a zip archive, or a single DSX file
    pub fn process_path(&self, path: &Path) -> BatchOutcome {
        if path.is_dir() {
            self.process_directory(path)
        } else if is_zip(path) {
            self.process_archive(path)
        } else {
            let mut outcome = BatchOutcome::default();
            match read_document(path) {
                Ok(document) => outcome.merge(self.process([document])),
                Err(err) => outcome.failures.push(err),
            }
            outcome
        }
    }

    /// Every `.dsx` file under `dir`, plus the `.dsx` entries of any zip archive found
    pub fn process_directory(&self, dir: &Path) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut documents = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let document = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| dir.display().to_string());
                    outcome.failures.push(BatchError::Read {
                        document,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if is_zip(path) {
                outcome.merge(self.process_archive(path));
            } else if path.to_str().map(is_dsx_name).unwrap_or(false) {
                match read_document(path) {
                    Ok(document) => documents.push(document),
                    Err(err) => outcome.failures.push(err),
                }
            }
        }

        outcome.merge(self.process(documents));
        outcome
    }

    /// Every `.dsx` entry of one zip archive
    pub fn process_archive(&self, path: &Path) -> BatchOutcome {
        let archive_name = path.display().to_string();

        let contents = match read_archive_file(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(archive = %archive_name, error = %e, "cannot open archive");
                return BatchOutcome {
                    results: Vec::new(),
                    failures: vec![BatchError::Archive {
                        document: archive_name,
                        message: e.to_string(),
                    }],
                };
            }
        };

        let mut outcome = self.process(contents.documents);
        outcome.failures.extend(contents.failures.into_iter().map(|e| BatchError::Read {
            document: format!("{}:{}", archive_name, e.entry().unwrap_or("?")),
            message: e.to_string(),
        }));
        outcome
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

fn read_document(path: &Path) -> Result<SourceDocument, BatchError> {
    let name = path.display().to_string();
    std::fs::read(path)
        .map(|bytes| SourceDocument::from_bytes(name.clone(), &bytes))
        .map_err(|e| BatchError::Read {
            document: name,
            message: e.to_string(),
        })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "extraction panicked".to_string()
    }
}
