//! Transformer stage extraction
//!
//! Transformer stages carry generated code in a `TrxGenCode` block. Only the
//! assignment lines are kept as rules; declarations, comments and framework
//! hook calls are dropped.

use dsxlens_core::Transform;

use crate::patterns::{
    FRAMEWORK_HOOK, INPUT_DECLARATION, OUTPUT_DECLARATION, REJECT_GUARD, TRANSFORM_CODE,
    TYPE_DECLARATION,
};
use crate::resolver::owning_record_name;
use crate::text::collapse_whitespace;

/// Name used when the owning stage of a code block cannot be resolved
pub const UNRESOLVED_TRANSFORM: &str = "unknown";

/// Extract every transformer with at least one rule
pub fn extract(document: &str) -> Vec<Transform> {
    let mut transforms = Vec::new();

    for caps in TRANSFORM_CODE.captures_iter(document) {
        let Some(code) = caps.get(1) else { continue };

        let name = owning_record_name(document, code.start()).unwrap_or(UNRESOLVED_TRANSFORM);
        let transform = parse_code(name, code.as_str());

        if transform.rules.is_empty() {
            tracing::debug!(stage = name, "transformer code without rules");
            continue;
        }
        transforms.push(transform);
    }

    tracing::debug!(count = transforms.len(), "extracted transforms");
    transforms
}

/// Build a transform from one code body
pub fn parse_code(name: &str, code: &str) -> Transform {
    let rules = code
        .lines()
        .filter(|line| is_rule(line))
        .map(collapse_whitespace)
        .collect();

    let declared = |pattern: &regex::Regex| -> Vec<String> {
        pattern
            .captures_iter(code)
            .map(|caps| caps[1].to_string())
            .collect()
    };

    let reject_conditions = REJECT_GUARD
        .captures_iter(code)
        .map(|caps| caps[1].trim().to_string())
        .filter(|predicate| !predicate.is_empty())
        .collect();

    Transform {
        name: name.to_string(),
        rules,
        input_links: declared(&INPUT_DECLARATION),
        output_links: declared(&OUTPUT_DECLARATION),
        reject_conditions,
    }
}

/// Whether a code line is a business rule
fn is_rule(line: &str) -> bool {
    let line = line.trim();

    if line.is_empty() || line.starts_with("//") || line.starts_with("/*") || line.starts_with('*') {
        return false;
    }

    has_assignment(line) && !TYPE_DECLARATION.is_match(line) && !FRAMEWORK_HOOK.is_match(line)
}

/// Whether the line contains `=` used as assignment (not `==`, `!=`, `<=`, `>=`)
fn has_assignment(line: &str) -> bool {
    let bytes = line.as_bytes();

    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b'=' {
            return false;
        }
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i + 1).copied();

        next != Some(b'=') && !matches!(prev, Some(b'=' | b'!' | b'<' | b'>'))
    })
}
