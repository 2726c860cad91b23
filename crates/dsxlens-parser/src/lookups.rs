//! Lookup stage extraction

use dsxlens_core::{Lookup, LookupMethod};

use crate::patterns::{
    capture, record_head, KEY_POSITION, LINK_NAME, LOOKUP_FAIL, LOOKUP_TYPE, NAME, RECORD,
    RESIDUAL, STAGE_TYPE, SUBRECORD,
};
use crate::text::is_present;

/// Stage type of lookup stages
pub const LOOKUP_STAGE_TYPE: &str = "PxLookup";

/// Extract every lookup stage with at least one input or key column
pub fn extract(document: &str) -> Vec<Lookup> {
    let lookups: Vec<Lookup> = RECORD
        .captures_iter(document)
        .filter_map(|caps| {
            let body = caps.get(1)?.as_str();
            let head = record_head(body);

            if capture(&STAGE_TYPE, head) != Some(LOOKUP_STAGE_TYPE) {
                return None;
            }
            let name = capture(&NAME, head).filter(|n| is_present(n))?;

            parse_lookup(name, body)
        })
        .collect();

    tracing::debug!(count = lookups.len(), "extracted lookups");
    lookups
}

/// Build a lookup from one stage record body
fn parse_lookup(name: &str, body: &str) -> Option<Lookup> {
    let fail_mode = capture(&LOOKUP_FAIL, body).map(str::trim);

    // Input links only count when the stage declares a fail policy
    let mut input_links: Vec<String> = Vec::new();
    if fail_mode.is_some() {
        for caps in LINK_NAME.captures_iter(body) {
            let link = caps[1].trim();
            if is_present(link) && !input_links.iter().any(|l| l == link) {
                input_links.push(link.to_string());
            }
        }
    }

    let key_columns: Vec<String> = SUBRECORD
        .captures_iter(body)
        .filter_map(|sub| {
            let sub = sub.get(1)?.as_str();
            let position: u32 = capture(&KEY_POSITION, sub)?.parse().ok()?;
            let column = capture(&NAME, sub).filter(|n| is_present(n))?;
            (position != 0).then(|| column.to_string())
        })
        .collect();

    if input_links.is_empty() && key_columns.is_empty() {
        tracing::debug!(stage = name, "lookup without inputs or keys");
        return None;
    }

    Some(Lookup {
        name: name.to_string(),
        input_links,
        fail_mode: fail_mode.unwrap_or_default().to_string(),
        key_columns,
        lookup_method: capture(&LOOKUP_TYPE, body)
            .filter(|code| is_present(code))
            .map(LookupMethod::from_code),
        residual: capture(&RESIDUAL, body)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(fields: &str, subrecords: &str) -> String {
        format!(
            "BEGIN DSRECORD\n   Identifier \"V0S2\"\n   Name \"lkp_Region\"\n   StageType \"PxLookup\"\n{fields}{subrecords}END DSRECORD\n"
        )
    }

    const KEYS: &str = "   BEGIN DSSUBRECORD\n      Name \"REGION_CD\"\n      KeyPosition \"1\"\n   END DSSUBRECORD\n   BEGIN DSSUBRECORD\n      Name \"REGION_NAME\"\n      KeyPosition \"0\"\n   END DSSUBRECORD\n";

    #[test]
    fn full_lookup() {
        let doc = record(
            "   LookupFail \"continue\"\n   LinkName \"lnk_clean\"\n   LinkName \"lnk_ref\"\n   LookupType \"1\"\n   Residual \"drop\"\n",
            KEYS,
        );
        let lookups = extract(&doc);

        assert_eq!(
            lookups,
            vec![Lookup {
                name: "lkp_Region".into(),
                input_links: vec!["lnk_clean".into(), "lnk_ref".into()],
                fail_mode: "continue".into(),
                key_columns: vec!["REGION_CD".into()],
                lookup_method: Some(LookupMethod::Sparse),
                residual: Some("drop".into()),
            }]
        );
    }

    #[test]
    fn inputs_require_fail_policy() {
        let doc = record("   LinkName \"lnk_clean\"\n", KEYS);
        let lookups = extract(&doc);

        assert_eq!(lookups.len(), 1);
        assert!(lookups[0].input_links.is_empty());
        assert_eq!(lookups[0].fail_mode, "");
        assert_eq!(lookups[0].key_columns, vec!["REGION_CD".to_string()]);
    }

    #[test]
    fn unmapped_method_passes_through() {
        let doc = record("   LookupFail \"fail\"\n   LinkName \"a\"\n   LookupType \"7\"\n", "");
        assert_eq!(extract(&doc)[0].lookup_method, Some(LookupMethod::Other("7".into())));
    }

    #[test]
    fn empty_lookup_is_skipped() {
        let doc = record("   LinkName \"lnk_clean\"\n", "");
        assert!(extract(&doc).is_empty());
    }

    #[test]
    fn other_stage_types_are_ignored() {
        let doc = record("   LookupFail \"continue\"\n   LinkName \"a\"\n", KEYS).replace("PxLookup", "PxJoin");
        assert!(extract(&doc).is_empty());
    }
}
