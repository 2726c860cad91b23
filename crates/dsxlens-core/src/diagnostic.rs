//! Validation issue codes and reporting
//!
//! IMPORTANT: Issue codes are stable.
//! NEVER rename or remove codes - downstream tooling matches on them.

use serde::{Deserialize, Serialize};

/// Structural issue codes (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// No job name was recovered
    MissingName,

    /// No job type was recovered
    MissingType,

    /// Neither sources nor targets were recovered; usually a total parse failure
    NoSourcesOrTargets,

    /// A stage never appears on either end of a flow connection
    DisconnectedStage,
}

impl IssueCode {
    /// Get the issue code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingName => "MISSING_NAME",
            Self::MissingType => "MISSING_TYPE",
            Self::NoSourcesOrTargets => "NO_SOURCES_OR_TARGETS",
            Self::DisconnectedStage => "DISCONNECTED_STAGE",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A non-fatal structural issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable issue code
    pub code: IssueCode,

    /// Human-readable message
    pub message: String,

    /// Stage the issue is about, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl Issue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            stage: None,
        }
    }

    /// Attach the stage this issue refers to
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `true` when no issue was found
    pub valid: bool,

    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }

    /// Issue messages as plain strings
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.message.clone()).collect()
    }

    pub fn has_code(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}
