//! Packaging extracted jobs as a zip of JSON files

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::ProcessedJob;
use crate::error::ArchiveError;

/// Entry name for each job, in order
///
/// Jobs are named after the job, falling back to the source file stem.
/// Path separators are replaced and repeated names get a numeric suffix.
pub fn entry_names(jobs: &[ProcessedJob]) -> Vec<String> {
    let mut seen = HashSet::new();

    jobs.iter()
        .map(|processed| {
            let base = sanitize(&base_name(processed));
            let mut name = format!("{}.json", base);
            let mut n = 1;
            while !seen.insert(name.clone()) {
                n += 1;
                name = format!("{}_{}.json", base, n);
            }
            name
        })
        .collect()
}

fn base_name(processed: &ProcessedJob) -> String {
    if !processed.job.name.trim().is_empty() {
        return processed.job.name.trim().to_string();
    }

    Path::new(&processed.source_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("job")
        .to_string()
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

/// Serialize jobs into an in-memory zip, one pretty-printed JSON entry per job
pub fn export_archive(jobs: &[ProcessedJob]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (processed, name) in jobs.iter().zip(entry_names(jobs)) {
        let json = serde_json::to_string_pretty(&processed.job).map_err(|e| ArchiveError::Serialize {
            job: name.clone(),
            message: e.to_string(),
        })?;

        writer.start_file(name.as_str(), options)?;
        writer.write_all(json.as_bytes())?;
        tracing::debug!(entry = %name, bytes = json.len(), "exported job");
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Export jobs and write the zip to `path`
pub fn write_archive(jobs: &[ProcessedJob], path: &Path) -> Result<(), ArchiveError> {
    let bytes = export_archive(jobs)?;
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), jobs = jobs.len(), "wrote archive");
    Ok(())
}
