//! Top-level extraction
//!
//! Every extractor re-scans the same immutable document; they only share the
//! read-only symbol table and column index.

use dsxlens_core::{Config, ExtractionMetadata, JobInfo};
use dsxlens_parser::{
    filters, header, lookups, parameters, specialized, transforms, ColumnIndex, FlowAssembler,
    StageExtractor, SymbolTable,
};

use crate::estimate::TokenEstimate;

/// Extracts a `JobInfo` from one DSX document
pub struct DsxExtractor {
    config: Config,
    flow: FlowAssembler,
}

impl Default for DsxExtractor {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DsxExtractor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            flow: FlowAssembler::default(),
        }
    }

    /// Replace the flow strategies
    pub fn with_flow_assembler(mut self, flow: FlowAssembler) -> Self {
        self.flow = flow;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract the job described by `document`
    ///
    /// Never fails: missing constructs leave their fields empty. When
    /// `estimate_tokens` is set, `metadata.token_count` carries the estimate.
    pub fn extract(&self, document: &str, estimate_tokens: bool) -> JobInfo {
        let header = header::extract(document);
        let symbols = SymbolTable::build(document);
        let columns = ColumnIndex::build(document, &symbols, &self.config.extraction);
        let stages = StageExtractor::new(&symbols, &columns, &self.config.extraction).extract(document);

        let metadata = ExtractionMetadata::for_document(document).with_tool_version(header.tool_version);

        let mut job = JobInfo {
            name: header.name,
            description: header.description,
            job_type: header.job_type,
            parameters: parameters::extract(document),
            sources: stages.sources,
            targets: stages.targets,
            transforms: transforms::extract(document),
            sql_scripts: stages.sql_scripts,
            lookups: lookups::extract(document),
            filters: filters::extract(document),
            specialized_stages: specialized::extract(document),
            flow: self.flow.assemble(document, &symbols, &columns),
            metadata,
        };

        if estimate_tokens {
            let estimate = TokenEstimate::for_job(&job, self.config.estimate.chars_per_token);
            job.metadata.token_count = Some(estimate.total);
        }

        tracing::debug!(
            job = %job.name,
            sources = job.sources.len(),
            targets = job.targets.len(),
            links = job.flow.len(),
            "extracted job"
        );
        job
    }
}

/// Extract with default configuration
pub fn extract(document: &str, estimate_tokens: bool) -> JobInfo {
    DsxExtractor::default().extract(document, estimate_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsxlens_core::JobType;

    #[test]
    fn empty_document_yields_empty_job() {
        let job = extract("", false);

        assert_eq!(job.name, "");
        assert_eq!(job.description, "");
        assert_eq!(job.job_type, JobType::Unspecified);
        assert!(job.parameters.is_empty());
        assert!(job.sources.is_empty());
        assert!(job.targets.is_empty());
        assert!(job.flow.is_empty());
        assert!(!job.metadata.extracted_at.is_empty());
        assert_eq!(job.metadata.token_count, None);
    }

    #[test]
    fn token_count_only_when_requested() {
        let doc = "BEGIN DSJOB\n   Identifier \"J\"\nEND DSJOB\n";
        assert_eq!(extract(doc, false).metadata.token_count, None);
        assert!(extract(doc, true).metadata.token_count.unwrap_or(0) > 0);
    }

    #[test]
    fn tool_version_is_recorded() {
        let job = extract("BEGIN HEADER\n   ToolVersion \"8\"\nEND HEADER\n", false);
        assert_eq!(job.metadata.tool_version.as_deref(), Some("8"));
    }
}
