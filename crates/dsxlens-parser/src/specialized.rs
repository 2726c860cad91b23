//! Stages with a fixed, well-known role
//!
//! Sorts, joins, aggregations and the like carry no SQL and no generated
//! code; what matters is their type and their single-line properties.

use std::collections::BTreeMap;

use dsxlens_core::SpecializedStage;

use crate::filters::properties;
use crate::patterns::{capture, record_head, NAME, RECORD, STAGE_TYPE};
use crate::text::is_present;

/// Recognized stage types and their category
pub const CATALOGUE: &[(&str, &str)] = &[
    ("PxSort", "sort"),
    ("PxAggregator", "aggregate"),
    ("PxJoin", "join"),
    ("PxFunnel", "funnel"),
    ("PxRemDup", "deduplicate"),
    ("PxMerge", "merge"),
    ("PxChangeCapture", "change_capture"),
    ("PxPivot", "pivot"),
    ("PxCopy", "copy"),
    ("PxModify", "modify"),
    ("PxSurrogateKeyGenerator", "surrogate_key"),
];

/// Category of a stage type, if it is in the catalogue
pub fn category(stage_type: &str) -> Option<&'static str> {
    CATALOGUE
        .iter()
        .find(|(known, _)| *known == stage_type)
        .map(|(_, category)| *category)
}

/// Extract every catalogued stage
pub fn extract(document: &str) -> Vec<SpecializedStage> {
    let mut stages = Vec::new();

    for caps in RECORD.captures_iter(document) {
        let body = &caps[1];
        let head = record_head(body);

        let Some(stage_type) = capture(&STAGE_TYPE, head) else { continue };
        let Some(category) = category(stage_type) else { continue };
        let Some(name) = capture(&NAME, head).filter(|n| is_present(n)) else { continue };

        let mut props = BTreeMap::new();
        for (key, value) in properties(body) {
            props.entry(key.to_string()).or_insert_with(|| value.to_string());
        }

        stages.push(SpecializedStage {
            name: name.to_string(),
            stage_type: stage_type.to_string(),
            category: category.to_string(),
            properties: props,
        });
    }

    tracing::debug!(count = stages.len(), "extracted specialized stages");
    stages
}
