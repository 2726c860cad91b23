//! Job header and metadata extraction

use dsxlens_core::JobType;

use crate::patterns::{
    capture, FULL_DESCRIPTION, IDENTIFIER, JOB_TYPE, PARAGRAPH_BREAK, SHORT_DESCRIPTION,
    TOOL_VERSION,
};
use crate::text::collapse_whitespace;

/// Job-level fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobHeader {
    pub name: String,
    pub description: String,
    pub job_type: JobType,
    pub tool_version: Option<String>,
}

/// Extract the job header. Absent fields stay empty.
pub fn extract(document: &str) -> JobHeader {
    let name = capture(&IDENTIFIER, document)
        .map(|n| n.trim().to_string())
        .unwrap_or_default();

    let job_type = capture(&JOB_TYPE, document)
        .map(JobType::from_code)
        .unwrap_or(JobType::Unspecified);

    let tool_version = capture(&TOOL_VERSION, document)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    JobHeader {
        name,
        description: description(document),
        job_type,
        tool_version,
    }
}

/// First paragraph of the long description, on one line
///
/// Falls back to the single-line `Description` field.
fn description(document: &str) -> String {
    if let Some(block) = capture(&FULL_DESCRIPTION, document) {
        let first = PARAGRAPH_BREAK
            .split(block.trim_start_matches(['\r', '\n']))
            .next()
            .unwrap_or_default();
        let text = collapse_whitespace(first);
        if !text.is_empty() {
            return text;
        }
    }

    capture(&SHORT_DESCRIPTION, document)
        .map(collapse_whitespace)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_header() {
        let doc = "BEGIN HEADER\n   ToolVersion \"8\"\nEND HEADER\nBEGIN DSJOB\n   Identifier \"LoadCustomers\"\n   BEGIN DSRECORD\n      Description \"short\"\n      FullDescription =+=+=+=\nLoads customers\nfrom staging.\n\nSecond paragraph.\n=+=+=+=\n      JobType \"3\"\n   END DSRECORD\n";
        let header = extract(doc);

        assert_eq!(header.name, "LoadCustomers");
        assert_eq!(header.description, "Loads customers from staging.");
        assert_eq!(header.job_type, JobType::Parallel);
        assert_eq!(header.tool_version.as_deref(), Some("8"));
    }

    #[test]
    fn short_description_fallback() {
        let doc = "Identifier \"J\"\n   Description \"Nightly   load\"\n";
        assert_eq!(extract(doc).description, "Nightly load");
    }

    #[test]
    fn missing_fields_are_empty() {
        let header = extract("nothing to see here");
        assert_eq!(header, JobHeader::default());
        assert_eq!(header.job_type.label(), "");
    }

    #[test]
    fn unknown_job_type_keeps_code() {
        let header = extract("JobType \"17\"");
        assert_eq!(header.job_type.label(), "Unknown (17)");
    }
}
