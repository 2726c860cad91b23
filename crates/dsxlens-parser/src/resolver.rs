//! Symbol resolution
//!
//! Builds the stage-identifier → name and stage-name → type maps every other
//! extractor uses to attach human names. A miss is never fatal: lookups
//! report [`UNKNOWN`] and extraction continues.

use std::collections::HashMap;

use crate::patterns::{
    capture, record_head, NAME, PIN_ID, RECORD, RECORD_HEADER, STAGE_LIST, STAGE_NAMES,
    STAGE_TYPE,
};
use crate::text::{is_present, split_pipe_list};

/// Placeholder reported for identifiers that cannot be resolved
pub const UNKNOWN: &str = "Unknown";

/// Read-only symbol maps for one document
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Stage identifier (e.g. `V0S3`) → stage name
    stage_names: HashMap<String, String>,

    /// Stage name → stage type (e.g. `PxLookup`)
    stage_types: HashMap<String, String>,
}

impl SymbolTable {
    /// Build both maps from the raw document
    pub fn build(document: &str) -> Self {
        let stage_names = Self::collect_stage_names(document);
        let stage_types = Self::collect_stage_types(document);

        tracing::debug!(
            ids = stage_names.len(),
            typed = stage_types.len(),
            "resolved stage symbols"
        );

        Self { stage_names, stage_types }
    }

    /// Align `StageList` and `StageNames` by position
    fn collect_stage_names(document: &str) -> HashMap<String, String> {
        let mut names = HashMap::new();

        let (Some(ids), Some(labels)) = (
            capture(&STAGE_LIST, document),
            capture(&STAGE_NAMES, document),
        ) else {
            return names;
        };

        for (id, name) in split_pipe_list(ids).into_iter().zip(split_pipe_list(labels)) {
            if !is_present(id) || !is_present(name) {
                continue;
            }
            names.insert(id.trim().to_string(), name.to_string());
        }

        names
    }

    /// Name/type pairs declared within the same record; last writer wins
    fn collect_stage_types(document: &str) -> HashMap<String, String> {
        let mut types = HashMap::new();

        for caps in RECORD.captures_iter(document) {
            let head = record_head(&caps[1]);
            if let (Some(name), Some(stage_type)) =
                (capture(&NAME, head), capture(&STAGE_TYPE, head))
            {
                types.insert(name.to_string(), stage_type.to_string());
            }
        }

        types
    }

    /// Resolve a stage identifier, or [`UNKNOWN`]
    pub fn stage_name(&self, id: &str) -> &str {
        self.stage_names
            .get(id.trim())
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    /// Resolve a stage identifier, `None` when unresolved
    pub fn resolve(&self, id: &str) -> Option<&str> {
        Some(self.stage_name(id)).filter(|name| *name != UNKNOWN)
    }

    /// Resolve the stage owning a pin identifier such as `V0S3P1`
    pub fn resolve_pin(&self, pin_id: &str) -> Option<&str> {
        capture(&PIN_ID, pin_id.trim()).and_then(|stage_id| self.resolve(stage_id))
    }

    /// Stage type for a stage name, or [`UNKNOWN`]
    pub fn stage_type(&self, name: &str) -> &str {
        self.stage_types
            .get(name)
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    /// Whether a record declaring this name and a stage type exists
    pub fn is_typed_stage(&self, name: &str) -> bool {
        self.stage_types.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.stage_names.is_empty() && self.stage_types.is_empty()
    }
}

/// Name of the record enclosing `pos`: the first `Name` after the nearest
/// preceding record header
///
/// This is a proximity heuristic; the format has no reliable nesting marker.
pub fn owning_record_name(document: &str, pos: usize) -> Option<&str> {
    let before = &document[..pos];
    let header = before.rfind(RECORD_HEADER)?;
    capture(&NAME, &before[header..]).filter(|name| is_present(name))
}
