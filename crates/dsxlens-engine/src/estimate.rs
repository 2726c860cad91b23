//! Token estimation
//!
//! A rough size measure for downstream budgeting: serialized characters
//! divided by a fixed ratio, rounded up.

use dsxlens_core::JobInfo;
use serde::Serialize;

/// Size of one top-level section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionEstimate {
    pub section: &'static str,
    pub chars: usize,
    pub tokens: usize,
}

/// Size of a whole job, with a per-section breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenEstimate {
    /// Estimate for the complete serialized job
    pub total: usize,

    /// Name, description, type and metadata together
    pub basic: usize,

    pub sections: Vec<SectionEstimate>,
}

impl TokenEstimate {
    /// Estimate a job, counting `chars_per_token` characters per token
    pub fn for_job(job: &JobInfo, chars_per_token: usize) -> Self {
        let divisor = chars_per_token.max(1);
        let tokens = |chars: usize| chars.div_ceil(divisor);

        let basic_chars = serialized_len(&serde_json::json!({
            "name": job.name,
            "description": job.description,
            "type": job.job_type,
            "metadata": job.metadata,
        }));

        let sections = [
            ("parameters", serialized_len(&job.parameters)),
            ("sources", serialized_len(&job.sources)),
            ("targets", serialized_len(&job.targets)),
            ("transforms", serialized_len(&job.transforms)),
            ("sql_scripts", serialized_len(&job.sql_scripts)),
            ("lookups", serialized_len(&job.lookups)),
            ("filters", serialized_len(&job.filters)),
            ("specialized_stages", serialized_len(&job.specialized_stages)),
            ("flow", serialized_len(&job.flow)),
        ]
        .into_iter()
        .map(|(section, chars)| SectionEstimate {
            section,
            chars,
            tokens: tokens(chars),
        })
        .collect();

        Self {
            total: tokens(serialized_len(job)),
            basic: tokens(basic_chars),
            sections,
        }
    }

    /// Breakdown entry for one section
    pub fn section(&self, name: &str) -> Option<&SectionEstimate> {
        self.sections.iter().find(|s| s.section == name)
    }
}

/// Length of the compact JSON form
fn serialized_len<T: Serialize + ?Sized>(value: &T) -> usize {
    serde_json::to_string(value).map(|s| s.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsxlens_core::{ExtractionMetadata, Parameter, ParameterType};

    fn job() -> JobInfo {
        let mut job = JobInfo::empty(ExtractionMetadata::for_document("doc"));
        job.name = "LoadCustomers".into();
        job.parameters.push(Parameter {
            name: "pRunDate".into(),
            prompt: "Run date".into(),
            default_value: String::new(),
            help_text: String::new(),
            param_type: ParameterType::Date,
        });
        job
    }

    #[test]
    fn total_is_serialized_length_over_divisor() {
        let job = job();
        let chars = serde_json::to_string(&job).unwrap().len();

        let estimate = TokenEstimate::for_job(&job, 4);
        assert_eq!(estimate.total, chars.div_ceil(4));
    }

    #[test]
    fn sections_are_reported() {
        let estimate = TokenEstimate::for_job(&job(), 4);

        assert_eq!(estimate.sections.len(), 9);
        let params = estimate.section("parameters").unwrap();
        assert!(params.tokens > 0);
        // empty list serializes as "[]"
        assert_eq!(estimate.section("flow").unwrap().tokens, 1);
        assert!(estimate.basic > 0);
        assert!(estimate.section("unknown").is_none());
    }

    #[test]
    fn zero_divisor_is_clamped() {
        let job = job();
        let chars = serde_json::to_string(&job).unwrap().len();
        assert_eq!(TokenEstimate::for_job(&job, 0).total, chars);
    }
}
