//! Flow assembly
//!
//! Links are recovered by correlating the container's parallel pipe lists by
//! position. Export variants without those lists fall back to scanning the
//! output pin records directly.

use dsxlens_core::FlowConnection;
use regex::Regex;

use crate::columns::ColumnIndex;
use crate::patterns::{
    capture, record_head, IDENTIFIER, LINK_NAMES, LINK_SOURCE_PINS, LINK_TARGET_STAGES, NAME,
    OLE_TYPE, PARTNER, PIN_ID, RECORD,
};
use crate::resolver::SymbolTable;
use crate::text::{is_present, split_pipe_list};

/// One way of recovering links from a document
pub trait FlowStrategy {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Whether the document carries the fields this strategy reads
    fn applies(&self, document: &str) -> bool;

    fn connections(
        &self,
        document: &str,
        symbols: &SymbolTable,
        columns: &ColumnIndex,
    ) -> Vec<FlowConnection>;
}

/// Positional correlation of `LinkNames`, `LinkSourcePinIDs` and `LinkTargetStageIDs`
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelListStrategy;

impl FlowStrategy for ParallelListStrategy {
    fn name(&self) -> &'static str {
        "parallel-lists"
    }

    fn applies(&self, document: &str) -> bool {
        LINK_NAMES.is_match(document)
            || LINK_SOURCE_PINS.is_match(document)
            || LINK_TARGET_STAGES.is_match(document)
    }

    fn connections(
        &self,
        document: &str,
        symbols: &SymbolTable,
        columns: &ColumnIndex,
    ) -> Vec<FlowConnection> {
        let links = pipe_list(&LINK_NAMES, document);
        let pins = pipe_list(&LINK_SOURCE_PINS, document);
        let targets = pipe_list(&LINK_TARGET_STAGES, document);

        let aligned = links.len().min(pins.len()).min(targets.len());
        if aligned < links.len().max(pins.len()).max(targets.len()) {
            tracing::warn!(
                links = links.len(),
                pins = pins.len(),
                targets = targets.len(),
                "link lists differ in length, truncating to {aligned}"
            );
        }

        let mut connections = Vec::new();

        for ((link, pin), target) in links.iter().zip(&pins).zip(&targets) {
            if !is_present(link) || !is_present(pin) || !is_present(target) {
                continue;
            }

            let Some(source_id) = capture(&PIN_ID, pin.trim()) else {
                tracing::debug!(pin = pin.trim(), "pin identifier without position suffix");
                continue;
            };

            let (Some(from), Some(to)) = (symbols.resolve(source_id), symbols.resolve(target)) else {
                tracing::debug!(link = link.trim(), "link endpoint does not resolve");
                continue;
            };

            let link = link.trim();
            connections.push(
                FlowConnection::new(link, from, to).with_columns(columns.for_link(link).cloned()),
            );
        }

        connections
    }
}

fn pipe_list<'a>(pattern: &Regex, document: &'a str) -> Vec<&'a str> {
    capture(pattern, document)
        .map(split_pipe_list)
        .unwrap_or_default()
}

/// Direct scan of output pin records carrying their own `Partner`
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkRecordStrategy;

impl FlowStrategy for LinkRecordStrategy {
    fn name(&self) -> &'static str {
        "link-records"
    }

    fn applies(&self, _document: &str) -> bool {
        true
    }

    fn connections(
        &self,
        document: &str,
        symbols: &SymbolTable,
        columns: &ColumnIndex,
    ) -> Vec<FlowConnection> {
        let mut connections = Vec::new();

        for caps in RECORD.captures_iter(document) {
            let head = record_head(&caps[1]);

            let is_output_pin = capture(&OLE_TYPE, head)
                .map(|ole| ole.contains("Output"))
                .unwrap_or(false);
            if !is_output_pin {
                continue;
            }

            let from = capture(&IDENTIFIER, head).and_then(|pin| symbols.resolve_pin(pin));
            let to = capture(&PARTNER, head).and_then(|id| symbols.resolve(id));
            let (Some(from), Some(to)) = (from, to) else { continue };

            let attached = capture(&NAME, head)
                .filter(|n| is_present(n))
                .and_then(|link| columns.for_link(link))
                .cloned();

            connections.push(
                FlowConnection::new(format!("{from}_to_{to}"), from, to).with_columns(attached),
            );
        }

        connections
    }
}

/// Runs the first applicable strategy
pub struct FlowAssembler {
    strategies: Vec<Box<dyn FlowStrategy>>,
}

impl Default for FlowAssembler {
    fn default() -> Self {
        Self::new(vec![Box::new(ParallelListStrategy), Box::new(LinkRecordStrategy)])
    }
}

impl FlowAssembler {
    /// Strategies are tried in order
    pub fn new(strategies: Vec<Box<dyn FlowStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn assemble(
        &self,
        document: &str,
        symbols: &SymbolTable,
        columns: &ColumnIndex,
    ) -> Vec<FlowConnection> {
        let Some(strategy) = self.strategies.iter().find(|s| s.applies(document)) else {
            return Vec::new();
        };

        let connections = strategy.connections(document, symbols, columns);
        tracing::debug!(
            strategy = strategy.name(),
            count = connections.len(),
            "assembled flow"
        );
        connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsxlens_core::ExtractionConfig;
    use pretty_assertions::assert_eq;

    const CONTAINER: &str = r#"
BEGIN DSRECORD
   Identifier "V0"
   StageList "V0S0|V0S1|V0S2"
   StageNames "Extract|Clean|Load"
   LinkNames "lnk_a|lnk_b"
   LinkSourcePinIDs "V0S0P1|V0S1P2"
   LinkTargetStageIDs "V0S1|V0S2"
END DSRECORD
BEGIN DSRECORD
   Identifier "V0S0P1"
   OLEType "CCustomOutput"
   Name "lnk_a"
   Partner "V0S1|V0S1P1"
   BEGIN DSSUBRECORD
      Name "ID"
      SqlType "4"
   END DSSUBRECORD
END DSRECORD
"#;

    fn assemble(document: &str) -> Vec<FlowConnection> {
        let symbols = SymbolTable::build(document);
        let columns = ColumnIndex::build(document, &symbols, &ExtractionConfig::default());
        FlowAssembler::default().assemble(document, &symbols, &columns)
    }

    #[test]
    fn positional_links_with_columns() {
        let flow = assemble(CONTAINER);

        assert_eq!(flow.len(), 2);
        assert_eq!(flow[0].link, "lnk_a");
        assert_eq!((flow[0].from.as_str(), flow[0].to.as_str()), ("Extract", "Clean"));
        assert_eq!(flow[0].columns.as_ref().map(Vec::len), Some(1));
        assert_eq!((flow[1].from.as_str(), flow[1].to.as_str()), ("Clean", "Load"));
        assert_eq!(flow[1].columns, None);
    }

    #[test]
    fn unequal_lists_truncate() {
        let doc = CONTAINER.replace("LinkTargetStageIDs \"V0S1|V0S2\"", "LinkTargetStageIDs \"V0S1\"");
        let flow = assemble(&doc);
        assert_eq!(flow.len(), 1);
        assert_eq!(flow[0].link, "lnk_a");
    }

    #[test]
    fn unresolved_endpoints_are_dropped() {
        let doc = CONTAINER.replace("LinkTargetStageIDs \"V0S1|V0S2\"", "LinkTargetStageIDs \"V0S1|V0S9\"");
        let flow = assemble(&doc);
        assert_eq!(flow.len(), 1);
        assert!(flow.iter().all(|c| c.to != crate::resolver::UNKNOWN));
    }

    #[test]
    fn empty_positions_are_skipped() {
        let doc = CONTAINER.replace("LinkNames \"lnk_a|lnk_b\"", "LinkNames \" |lnk_b\"");
        let flow = assemble(&doc);
        assert_eq!(flow.len(), 1);
        assert_eq!(flow[0].link, "lnk_b");
    }

    #[test]
    fn fallback_without_parallel_lists() {
        let doc = CONTAINER
            .lines()
            .filter(|line| !line.trim_start().starts_with("Link"))
            .collect::<Vec<_>>()
            .join("\n");
        let flow = assemble(&doc);

        assert_eq!(flow.len(), 1);
        assert_eq!(flow[0].link, "Extract_to_Clean");
        assert_eq!(flow[0].from, "Extract");
        assert_eq!(flow[0].to, "Clean");
        assert_eq!(flow[0].columns.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn fallback_is_not_used_when_lists_exist() {
        let doc = CONTAINER.replace("LinkSourcePinIDs \"V0S0P1|V0S1P2\"", "LinkSourcePinIDs \"\"");
        assert!(assemble(&doc).is_empty());
    }
}
