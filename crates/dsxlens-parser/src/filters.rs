//! Filter stage extraction

use dsxlens_core::Filter;

use crate::patterns::{capture, record_head, NAME, RECORD, STAGE_TYPE, SUBRECORD, VALUE};
use crate::text::is_present;

/// Stage type of filter stages
pub const FILTER_STAGE_TYPE: &str = "PxFilter";

/// Extract every filter stage with at least one predicate
pub fn extract(document: &str) -> Vec<Filter> {
    let mut filters = Vec::new();

    for caps in RECORD.captures_iter(document) {
        let body = &caps[1];
        let head = record_head(body);

        if capture(&STAGE_TYPE, head) != Some(FILTER_STAGE_TYPE) {
            continue;
        }
        let Some(name) = capture(&NAME, head).filter(|n| is_present(n)) else {
            continue;
        };

        let mut filter = Filter {
            name: name.to_string(),
            ..Default::default()
        };

        for (key, value) in properties(body) {
            match key {
                "where" if !value.is_empty() => filter.predicates.push(value.to_string()),
                "reject" => filter.output_rejects = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if filter.predicates.is_empty() {
            tracing::debug!(stage = name, "filter without predicates");
            continue;
        }
        filters.push(filter);
    }

    tracing::debug!(count = filters.len(), "extracted filters");
    filters
}

/// Single-line `Name`/`Value` pairs of a record's sub-records, in order
pub(crate) fn properties(body: &str) -> impl Iterator<Item = (&str, &str)> + '_ {
    SUBRECORD.captures_iter(body).filter_map(|sub| {
        let sub = sub.get(1)?.as_str();
        let key = capture(&NAME, sub)?;
        let value = capture(&VALUE, sub)?;
        Some((key, value.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subrecords: &str) -> String {
        format!(
            "BEGIN DSRECORD\n   Identifier \"V0S8\"\n   Name \"flt_Active\"\n   StageType \"PxFilter\"\n{subrecords}END DSRECORD\n"
        )
    }

    fn property(key: &str, value: &str) -> String {
        format!("   BEGIN DSSUBRECORD\n      Name \"{key}\"\n      Value \"{value}\"\n   END DSSUBRECORD\n")
    }

    #[test]
    fn predicates_and_reject_flag() {
        let doc = record(&format!(
            "{}{}{}",
            property("where", "STATUS = 'A'"),
            property("where", "AMOUNT > 0"),
            property("reject", "True"),
        ));
        let filters = extract(&doc);

        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name, "flt_Active");
        assert_eq!(filters[0].predicates, vec!["STATUS = 'A'".to_string(), "AMOUNT > 0".to_string()]);
        assert!(filters[0].output_rejects);
    }

    #[test]
    fn filter_without_predicates_is_skipped() {
        let doc = record(&property("reject", "True"));
        assert!(extract(&doc).is_empty());
    }

    #[test]
    fn reject_defaults_to_false() {
        let doc = record(&property("where", "X = 1"));
        assert!(!extract(&doc)[0].output_rejects);
    }
}
