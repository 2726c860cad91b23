//! Column extraction from output pin records
//!
//! Each output pin record names a link and lists its columns as
//! sub-records. The resulting lists are indexed by link name for the flow
//! assembler, and by producing / consuming stage for the stage extractor.

use std::collections::HashMap;

use dsxlens_core::{format_column_type, Column, ExtractionConfig};
use regex::Regex;

use crate::patterns::{
    capture, record_head, DERIVATION, IDENTIFIER, NAME, NULLABLE, OLE_TYPE, PARTNER, PRECISION,
    RECORD, SCALE, SQL_TYPE, SUBRECORD,
};
use crate::resolver::SymbolTable;
use crate::text::is_present;

/// Columns indexed by link and by stage
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    by_link: HashMap<String, Vec<Column>>,

    /// Columns leaving a stage, in pin order
    outbound: HashMap<String, Vec<Column>>,

    /// Columns arriving at a stage, in pin order
    inbound: HashMap<String, Vec<Column>>,
}

impl ColumnIndex {
    /// Scan every output pin record in the document
    pub fn build(document: &str, symbols: &SymbolTable, config: &ExtractionConfig) -> Self {
        let mut index = Self::default();

        for caps in RECORD.captures_iter(document) {
            let body = &caps[1];
            let head = record_head(body);

            let is_output_pin = capture(&OLE_TYPE, head)
                .map(|ole| ole.contains("Output"))
                .unwrap_or(false);
            if !is_output_pin {
                continue;
            }

            let Some(link) = capture(&NAME, head).filter(|n| is_present(n)) else {
                continue;
            };

            let columns = parse_columns(body, config);
            if columns.is_empty() {
                continue;
            }

            if let Some(stage) = capture(&IDENTIFIER, head).and_then(|pin| symbols.resolve_pin(pin)) {
                index.outbound.entry(stage.to_string()).or_default().extend(columns.iter().cloned());
            }

            if let Some(stage) = capture(&PARTNER, head).and_then(|id| symbols.resolve(id)) {
                index.inbound.entry(stage.to_string()).or_default().extend(columns.iter().cloned());
            }

            index.by_link.insert(link.to_string(), columns);
        }

        tracing::debug!(links = index.by_link.len(), "indexed link columns");
        index
    }

    /// Columns registered for a link
    pub fn for_link(&self, link: &str) -> Option<&Vec<Column>> {
        self.by_link.get(link)
    }

    /// Columns on the links a stage writes
    pub fn outbound(&self, stage: &str) -> Vec<Column> {
        self.outbound.get(stage).cloned().unwrap_or_default()
    }

    /// Columns on the links a stage reads
    pub fn inbound(&self, stage: &str) -> Vec<Column> {
        self.inbound.get(stage).cloned().unwrap_or_default()
    }

    pub fn link_count(&self) -> usize {
        self.by_link.len()
    }
}

/// Column definitions of one pin record, with derivations attached
pub fn parse_columns(record_body: &str, config: &ExtractionConfig) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::new();

    for sub in SUBRECORD.captures_iter(record_body) {
        let body = &sub[1];
        let (Some(name), Some(code)) = (capture(&NAME, body), capture(&SQL_TYPE, body)) else {
            continue;
        };
        if !is_present(name) || config.is_reserved_column(name) {
            continue;
        }

        let precision = numeric_field(&PRECISION, body);
        let scale = numeric_field(&SCALE, body);
        let nullable = capture(&NULLABLE, body).map(|v| v != "0").unwrap_or(false);

        columns.push(
            Column::new(name, format_column_type(code, precision, scale)).with_nullable(nullable),
        );
    }

    for sub in SUBRECORD.captures_iter(record_body) {
        let body = &sub[1];
        let (Some(name), Some(derivation)) = (capture(&NAME, body), capture(&DERIVATION, body)) else {
            continue;
        };
        let derivation = derivation.trim();
        if derivation.is_empty() {
            continue;
        }

        match columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.derivation = Some(derivation.to_string()),
            None => tracing::debug!(column = name, "dropping derivation for unknown column"),
        }
    }

    columns
}

fn numeric_field(pattern: &Regex, body: &str) -> u32 {
    capture(pattern, body)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
BEGIN DSRECORD
   Identifier "V0"
   StageList "V0S0|V0S1"
   StageNames "Extract|Load"
END DSRECORD
BEGIN DSRECORD
   Identifier "V0S0P1"
   OLEType "CCustomOutput"
   Name "lnk_main"
   Partner "V0S1|V0S1P1"
   BEGIN DSSUBRECORD
      Name "CUST_ID"
      SqlType "4"
      Precision "10"
      Scale "0"
      Nullable "0"
      Derivation "in.CUST_ID"
   END DSSUBRECORD
   BEGIN DSSUBRECORD
      Name "AMOUNT"
      SqlType "3"
      Precision "12"
      Scale "2"
      Nullable "1"
   END DSSUBRECORD
   BEGIN DSSUBRECORD
      Name "APT_ROWID"
      SqlType "-5"
      Derivation "@INROWNUM"
   END DSSUBRECORD
END DSRECORD
BEGIN DSRECORD
   Identifier "V0S1P1"
   OLEType "CCustomInput"
   Name "lnk_main"
   BEGIN DSSUBRECORD
      Name "IGNORED"
      SqlType "4"
   END DSSUBRECORD
END DSRECORD
"#;

    fn index() -> ColumnIndex {
        ColumnIndex::build(DOC, &SymbolTable::build(DOC), &ExtractionConfig::default())
    }

    #[test]
    fn columns_indexed_by_link() {
        let index = index();
        let columns = index.for_link("lnk_main").unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "CUST_ID");
        assert_eq!(columns[0].data_type, "INTEGER");
        assert!(!columns[0].nullable);
        assert_eq!(columns[0].derivation.as_deref(), Some("in.CUST_ID"));
        assert_eq!(columns[1].data_type, "DECIMAL(12,2)");
        assert!(columns[1].nullable);
        assert_eq!(columns[1].derivation, None);
    }

    #[test]
    fn reserved_columns_are_excluded() {
        let index = index();
        let columns = index.for_link("lnk_main").unwrap();
        assert!(columns.iter().all(|c| !c.name.starts_with("APT_")));
    }

    #[test]
    fn input_pins_are_ignored() {
        let index = index();
        assert_eq!(index.link_count(), 1);
        assert!(index.outbound("Extract").iter().all(|c| c.name != "IGNORED"));
    }

    #[test]
    fn stage_side_indexes() {
        let index = index();
        assert_eq!(index.outbound("Extract").len(), 2);
        assert_eq!(index.inbound("Load").len(), 2);
        assert!(index.inbound("Extract").is_empty());
    }

    #[test]
    fn unknown_sql_type_is_preserved() {
        let body = "BEGIN DSSUBRECORD\n Name \"X\"\n SqlType \"77\"\nEND DSSUBRECORD";
        let columns = parse_columns(body, &ExtractionConfig::default());
        assert_eq!(columns[0].data_type, "UNKNOWN(77)");
    }
}
