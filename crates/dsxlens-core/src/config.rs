//! Configuration schema (dsxlens.toml)

use serde::{Deserialize, Serialize};

/// Extraction heuristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Column name prefixes marking system-generated columns
    #[serde(default = "default_reserved_prefixes")]
    pub reserved_column_prefixes: Vec<String>,

    /// Characters searched before a dataset value for its stage name
    #[serde(default = "default_dataset_lookbehind")]
    pub dataset_lookbehind: usize,

    /// Characters searched after a dataset value for its write mode
    #[serde(default = "default_dataset_lookahead")]
    pub dataset_lookahead: usize,

    /// Replacement for `#...#` parameter placeholders in connection strings
    #[serde(default = "default_redaction_marker")]
    pub redaction_marker: String,
}

fn default_reserved_prefixes() -> Vec<String> {
    vec!["APT_".to_string(), "@".to_string()]
}

fn default_dataset_lookbehind() -> usize {
    500
}

fn default_dataset_lookahead() -> usize {
    200
}

fn default_redaction_marker() -> String {
    "[REDACTED]".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            reserved_column_prefixes: default_reserved_prefixes(),
            dataset_lookbehind: default_dataset_lookbehind(),
            dataset_lookahead: default_dataset_lookahead(),
            redaction_marker: default_redaction_marker(),
        }
    }
}

impl ExtractionConfig {
    /// Check whether a column name is system-generated
    pub fn is_reserved_column(&self, name: &str) -> bool {
        self.reserved_column_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

/// Token estimation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Serialized characters per token
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,
}

fn default_chars_per_token() -> usize {
    4
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            chars_per_token: default_chars_per_token(),
        }
    }
}

/// Output rendering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: default_pretty() }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub estimate: EstimateConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.dataset_lookbehind, 500);
        assert_eq!(config.extraction.dataset_lookahead, 200);
        assert_eq!(config.estimate.chars_per_token, 4);
        assert!(config.output.pretty);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [extraction]
            reserved_column_prefixes = ["SYS_"]
            "#,
        )
        .unwrap();

        assert!(config.extraction.is_reserved_column("SYS_ROWID"));
        assert!(!config.extraction.is_reserved_column("APT_ROWID"));
        assert_eq!(config.extraction.redaction_marker, "[REDACTED]");
        assert_eq!(config.estimate.chars_per_token, 4);
    }

    #[test]
    fn reserved_prefixes() {
        let extraction = ExtractionConfig::default();
        assert!(extraction.is_reserved_column("APT_PARTITION"));
        assert!(extraction.is_reserved_column("@INROWNUM"));
        assert!(!extraction.is_reserved_column("CUST_ID"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::from_toml("[extraction\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
