//! Structural validation of an extracted job
//!
//! Issues are advisory. The job is never modified.

use dsxlens_core::{Issue, IssueCode, JobInfo, ValidationReport};
use dsxlens_parser::FlowGraph;

/// Sanity checks over an assembled job
pub struct Validator;

impl Validator {
    /// Check required fields and flow connectivity
    pub fn validate(job: &JobInfo) -> ValidationReport {
        let mut issues = Vec::new();

        if job.name.trim().is_empty() {
            issues.push(Issue::new(IssueCode::MissingName, "Job name is missing"));
        }

        if job.job_type.is_unspecified() {
            issues.push(Issue::new(IssueCode::MissingType, "Job type is missing"));
        }

        if job.sources.is_empty() && job.targets.is_empty() {
            issues.push(Issue::new(
                IssueCode::NoSourcesOrTargets,
                "No sources or targets were extracted",
            ));
        }

        let graph = FlowGraph::from_flow(&job.flow);
        for stage in job.stage_names() {
            if !graph.contains(stage) {
                issues.push(
                    Issue::new(
                        IssueCode::DisconnectedStage,
                        format!("Stage '{}' is not connected to any flow", stage),
                    )
                    .with_stage(stage),
                );
            }
        }

        tracing::debug!(job = %job.name, issues = issues.len(), "validated job");
        ValidationReport::from_issues(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsxlens_core::{ExtractionMetadata, FlowConnection, JobType, Source, Target};

    fn job() -> JobInfo {
        let mut job = JobInfo::empty(ExtractionMetadata::for_document(""));
        job.name = "LoadCustomers".into();
        job.job_type = JobType::Parallel;
        job.sources.push(Source { name: "Extract".into(), ..Default::default() });
        job.targets.push(Target { name: "Load".into(), ..Default::default() });
        job.flow.push(FlowConnection::new("lnk", "Extract", "Load"));
        job
    }

    #[test]
    fn connected_job_is_valid() {
        let report = Validator::validate(&job());
        assert!(report.valid);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn empty_job_reports_required_fields() {
        let job = JobInfo::empty(ExtractionMetadata::for_document(""));
        let report = Validator::validate(&job);

        assert!(!report.valid);
        assert!(report.has_code(IssueCode::MissingName));
        assert!(report.has_code(IssueCode::MissingType));
        assert!(report.has_code(IssueCode::NoSourcesOrTargets));
        assert_eq!(report.issues.len(), 3);
    }

    #[test]
    fn unknown_type_is_not_missing() {
        let mut job = job();
        job.job_type = JobType::Unknown("17".into());
        assert!(Validator::validate(&job).valid);
    }

    #[test]
    fn disconnected_source_is_reported() {
        let mut job = job();
        job.sources.push(Source { name: "Orphan".into(), ..Default::default() });
        let before = job.clone();

        let report = Validator::validate(&job);

        assert!(!report.valid);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].code, IssueCode::DisconnectedStage);
        assert_eq!(report.issues[0].stage.as_deref(), Some("Orphan"));
        assert!(report.messages()[0].contains("Orphan"));
        assert_eq!(job, before);
    }
}
