//! Extracted job model
//!
//! Everything here is built once per document by the extraction engine and
//! never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::codes::{JobType, LookupMethod, ParameterType, ScriptRole, WriteMode};
use crate::metadata::ExtractionMetadata;

/// A job parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub prompt: String,
    pub default_value: String,
    pub help_text: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
}

/// A column carried by a link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Rendered type, e.g. `VARCHAR(50)` or `UNKNOWN(77)`; never empty
    #[serde(rename = "type")]
    pub data_type: String,

    pub nullable: bool,

    /// Expression computing this column from upstream inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: false,
            derivation: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_derivation(mut self, derivation: impl Into<String>) -> Self {
        self.derivation = Some(derivation.into());
        self
    }
}

/// A stage reading data into the job
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    pub name: String,

    /// Stage type label, e.g. `OracleConnectorPX`
    #[serde(rename = "type")]
    pub stage_type: String,

    /// Normalized select statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    /// Predicates found after each `WHERE` in `sql`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub where_clauses: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Connection string with parameter placeholders redacted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Source {
    /// A source is only worth keeping if it carries SQL, a table, or columns
    pub fn has_content(&self) -> bool {
        self.sql.is_some() || self.table.is_some() || !self.columns.is_empty()
    }
}

/// A stage writing data out of the job
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Target {
    pub name: String,

    #[serde(rename = "type")]
    pub stage_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Dataset file name, set instead of `table` for dataset targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_mode: Option<WriteMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Target {
    pub fn has_content(&self) -> bool {
        self.table.is_some() || self.dataset.is_some() || !self.columns.is_empty()
    }
}

/// A transformer stage and the rules recovered from its generated code
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub name: String,

    /// Assignment lines, whitespace-collapsed
    pub rules: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_links: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_links: Vec<String>,

    /// Predicates guarding row rejection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reject_conditions: Vec<String>,
}

/// A stage node, tagged by role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Stage {
    Source(Source),
    Target(Target),
    Transform(Transform),
}

impl Stage {
    pub fn name(&self) -> &str {
        match self {
            Self::Source(s) => &s.name,
            Self::Target(t) => &t.name,
            Self::Transform(t) => &t.name,
        }
    }
}

/// A lookup stage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lookup {
    pub name: String,
    pub input_links: Vec<String>,

    /// Lookup-fail policy, verbatim (`continue`, `fail`, ...)
    pub fail_mode: String,

    pub key_columns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_method: Option<LookupMethod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual: Option<String>,
}

/// A SQL fragment embedded in a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlScript {
    /// Owning stage name
    pub stage: String,
    pub role: ScriptRole,
    pub sql: String,
}

/// A filter stage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub predicates: Vec<String>,
    pub output_rejects: bool,
}

/// A stage with a fixed, well-known role (sort, join, aggregate, ...)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecializedStage {
    pub name: String,
    pub stage_type: String,
    pub category: String,

    /// Single-line stage properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// A directed link between two resolved stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConnection {
    pub link: String,
    pub from: String,
    pub to: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
}

impl FlowConnection {
    pub fn new(link: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            from: from.into(),
            to: to.into(),
            columns: None,
        }
    }

    pub fn with_columns(mut self, columns: Option<Vec<Column>>) -> Self {
        self.columns = columns;
        self
    }
}

/// Root aggregate for one extracted job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    pub name: String,
    pub description: String,

    #[serde(rename = "type")]
    pub job_type: JobType,

    pub parameters: Vec<Parameter>,
    pub sources: Vec<Source>,
    pub targets: Vec<Target>,
    pub transforms: Vec<Transform>,
    pub sql_scripts: Vec<SqlScript>,
    pub lookups: Vec<Lookup>,
    pub filters: Vec<Filter>,
    pub specialized_stages: Vec<SpecializedStage>,
    pub flow: Vec<FlowConnection>,
    pub metadata: ExtractionMetadata,
}

impl JobInfo {
    /// An empty job carrying only metadata
    pub fn empty(metadata: ExtractionMetadata) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            job_type: JobType::Unspecified,
            parameters: Vec::new(),
            sources: Vec::new(),
            targets: Vec::new(),
            transforms: Vec::new(),
            sql_scripts: Vec::new(),
            lookups: Vec::new(),
            filters: Vec::new(),
            specialized_stages: Vec::new(),
            flow: Vec::new(),
            metadata,
        }
    }

    /// Names of every stage that should take part in the flow, first occurrence order
    pub fn stage_names(&self) -> Vec<&str> {
        let names = self
            .sources
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.targets.iter().map(|t| t.name.as_str()))
            .chain(self.transforms.iter().map(|t| t.name.as_str()))
            .chain(self.lookups.iter().map(|l| l.name.as_str()))
            .chain(self.specialized_stages.iter().map(|s| s.name.as_str()));

        let mut seen = std::collections::HashSet::new();
        names.filter(|name| seen.insert(*name)).collect()
    }

    /// Sources, targets and transforms as tagged stages
    pub fn stages(&self) -> Vec<Stage> {
        self.sources
            .iter()
            .cloned()
            .map(Stage::Source)
            .chain(self.targets.iter().cloned().map(Stage::Target))
            .chain(self.transforms.iter().cloned().map(Stage::Transform))
            .collect()
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_rules() {
        let mut source = Source {
            name: "src".into(),
            ..Default::default()
        };
        assert!(!source.has_content());
        source.columns.push(Column::new("ID", "INTEGER"));
        assert!(source.has_content());

        let target = Target {
            name: "tgt".into(),
            dataset: Some("out.ds".into()),
            ..Default::default()
        };
        assert!(target.has_content());
    }

    #[test]
    fn stage_names_are_deduplicated() {
        let mut job = JobInfo::empty(ExtractionMetadata::for_document(""));
        job.sources.push(Source { name: "A".into(), ..Default::default() });
        job.targets.push(Target { name: "B".into(), ..Default::default() });
        job.lookups.push(Lookup { name: "A".into(), ..Default::default() });

        assert_eq!(job.stage_names(), vec!["A", "B"]);
    }

    #[test]
    fn stage_variants_expose_names() {
        let stage = Stage::Transform(Transform { name: "xfm".into(), ..Default::default() });
        assert_eq!(stage.name(), "xfm");

        let json = serde_json::to_string(&stage).unwrap();
        assert!(json.contains("\"role\":\"transform\""));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let source = Source {
            name: "src".into(),
            stage_type: "OracleConnectorPX".into(),
            table: Some("CUSTOMERS".into()),
            ..Default::default()
        };

        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains("\"table\":\"CUSTOMERS\""));
        assert!(!json.contains("\"sql\""));
        assert!(!json.contains("where_clauses"));
    }
}
