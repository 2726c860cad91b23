//! Extraction metadata (stable v1)
//!
//! The output schema is versioned. Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Output schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl FormatVersion {
    /// Current output schema version
    pub const CURRENT: FormatVersion = FormatVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Metadata attached to every extracted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Timestamp (ISO 8601)
    pub extracted_at: String,

    /// Output schema version
    pub format_version: FormatVersion,

    /// `ToolVersion` from the export header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,

    /// SHA-256 of the source document
    pub source_hash: String,

    /// Approximate token count, only when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
}

impl ExtractionMetadata {
    /// Metadata for a document, stamped now
    pub fn for_document(document: &str) -> Self {
        Self {
            extracted_at: chrono::Utc::now().to_rfc3339(),
            format_version: FormatVersion::CURRENT,
            tool_version: None,
            source_hash: hash_document(document),
            token_count: None,
        }
    }

    pub fn with_tool_version(mut self, tool_version: Option<String>) -> Self {
        self.tool_version = tool_version;
        self
    }

    pub fn with_token_count(mut self, token_count: usize) -> Self {
        self.token_count = Some(token_count);
        self
    }
}

/// Hex SHA-256 of a document
pub fn hash_document(document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    hex::encode(hasher.finalize())
}
