//! Source and target extraction
//!
//! Connector stages embed an XML property block whose `Context` marker tells
//! a reading stage (`1`) from a writing stage (`2`). Dataset targets carry no
//! such block and are recovered by a separate proximity scan.

use dsxlens_core::{ExtractionConfig, ScriptRole, Source, SqlScript, Target, WriteMode};
use regex::Regex;

use crate::columns::ColumnIndex;
use crate::patterns::{
    capture, element_text, AFTER_SQL, BEFORE_SQL, CONNECTION, CONTEXT, DATABASE, DATASET,
    DATASET_MODE, NAME, SELECT_STATEMENT, TABLE_NAME, WRITE_MODE, XML_PROPERTIES,
};
use crate::resolver::{owning_record_name, SymbolTable};
use crate::text::{
    contains_sql_verb, decode_entities, last_path_segment, normalize_script, normalize_select,
    redact_placeholders, where_clauses, window_after, window_before,
};

/// Role a property block declares through its `Context` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageContext {
    Source,
    Target,
}

impl StageContext {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Source),
            "2" => Some(Self::Target),
            _ => None,
        }
    }
}

/// Sources, targets and SQL fragments recovered from one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSet {
    pub sources: Vec<Source>,
    pub targets: Vec<Target>,
    pub sql_scripts: Vec<SqlScript>,
}

/// Extracts connector and dataset stages
pub struct StageExtractor<'a> {
    symbols: &'a SymbolTable,
    columns: &'a ColumnIndex,
    config: &'a ExtractionConfig,
}

impl<'a> StageExtractor<'a> {
    pub fn new(symbols: &'a SymbolTable, columns: &'a ColumnIndex, config: &'a ExtractionConfig) -> Self {
        Self { symbols, columns, config }
    }

    /// Scan every property block and every dataset value
    pub fn extract(&self, document: &str) -> StageSet {
        let mut set = StageSet::default();

        for caps in XML_PROPERTIES.captures_iter(document) {
            let Some(block) = caps.get(1) else { continue };
            let xml = block.as_str();

            let Some(context) = capture(&CONTEXT, xml).and_then(StageContext::from_code) else {
                continue;
            };

            let Some(name) = owning_record_name(document, block.start()) else {
                tracing::debug!(offset = block.start(), "property block without owning stage");
                continue;
            };

            match context {
                StageContext::Source => {
                    let source = self.source(name, xml);
                    if source.has_content() {
                        set.sources.push(source);
                    } else {
                        tracing::debug!(stage = name, "source without recoverable content");
                    }
                }
                StageContext::Target => {
                    let target = self.target(name, xml);
                    if target.has_content() {
                        set.targets.push(target);
                    } else {
                        tracing::debug!(stage = name, "target without recoverable content");
                    }
                }
            }

            set.sql_scripts.extend(sql_scripts(name, xml));
        }

        set.targets.extend(self.dataset_targets(document));

        tracing::debug!(
            sources = set.sources.len(),
            targets = set.targets.len(),
            scripts = set.sql_scripts.len(),
            "extracted stages"
        );
        set
    }

    fn source(&self, name: &str, xml: &str) -> Source {
        let mut source = Source {
            name: name.to_string(),
            stage_type: self.symbols.stage_type(name).to_string(),
            connection: self.connection(xml),
            database: xml_value(&DATABASE, xml),
            columns: self.columns.outbound(name),
            ..Default::default()
        };

        match xml_value(&SELECT_STATEMENT, xml).map(|sql| normalize_select(&sql)) {
            Some(sql) if !sql.is_empty() => {
                source.where_clauses = where_clauses(&sql);
                source.sql = Some(sql);
            }
            _ => source.table = xml_value(&TABLE_NAME, xml),
        }

        source
    }

    fn target(&self, name: &str, xml: &str) -> Target {
        Target {
            name: name.to_string(),
            stage_type: self.symbols.stage_type(name).to_string(),
            table: xml_value(&TABLE_NAME, xml),
            write_mode: xml_value(&WRITE_MODE, xml).and_then(|code| WriteMode::from_code(&code)),
            connection: self.connection(xml),
            database: xml_value(&DATABASE, xml),
            columns: self.columns.inbound(name),
            ..Default::default()
        }
    }

    fn connection(&self, xml: &str) -> Option<String> {
        xml_value(&CONNECTION, xml)
            .map(|server| redact_placeholders(&server, &self.config.redaction_marker))
    }

    /// Targets written through a `dataset` property
    ///
    /// The owning stage is the nearest known stage name within
    /// `dataset_lookbehind` characters before the value; the write mode is
    /// searched within `dataset_lookahead` characters after it.
    pub fn dataset_targets(&self, document: &str) -> Vec<Target> {
        let mut targets = Vec::new();

        for caps in DATASET.captures_iter(document) {
            let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else { continue };

            let dataset = last_path_segment(path.as_str());
            if dataset.is_empty() {
                continue;
            }

            let before = window_before(document, whole.start(), self.config.dataset_lookbehind);
            let stage = NAME
                .captures_iter(before)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str())
                .filter(|name| self.symbols.is_typed_stage(name))
                .last();

            let Some(stage) = stage else {
                tracing::warn!(dataset, "dataset without a nearby stage name");
                continue;
            };

            let after = window_after(document, whole.end(), self.config.dataset_lookahead);
            let write_mode = capture(&DATASET_MODE, after).and_then(WriteMode::from_mode_name);

            targets.push(Target {
                name: stage.to_string(),
                stage_type: self.symbols.stage_type(stage).to_string(),
                dataset: Some(dataset.to_string()),
                write_mode,
                columns: self.columns.inbound(stage),
                ..Default::default()
            });
        }

        targets
    }
}

/// Decoded, trimmed text of an XML property element
fn xml_value(pattern: &Regex, xml: &str) -> Option<String> {
    element_text(pattern, xml)
        .map(decode_entities)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `BeforeSQL`, `AfterSQL` and `SelectStatement` fragments that contain SQL
pub fn sql_scripts(stage: &str, xml: &str) -> Vec<SqlScript> {
    ScriptRole::ALL
        .iter()
        .filter_map(|role| {
            let pattern: &Regex = match role {
                ScriptRole::BeforeSql => &*BEFORE_SQL,
                ScriptRole::AfterSql => &*AFTER_SQL,
                ScriptRole::SelectStatement => &*SELECT_STATEMENT,
            };
            let sql = xml_value(pattern, xml)?;
            if !contains_sql_verb(&sql) {
                return None;
            }

            Some(SqlScript {
                stage: stage.to_string(),
                role: *role,
                sql: normalize_script(&sql),
            })
        })
        .collect()
}
