//! Flow graph construction and traversal
//!
//! Builds forward and reverse adjacency from the assembled flow for lineage
//! queries and connectivity checks.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use dsxlens_core::FlowConnection;

/// Directed stage graph with forward and reverse edges
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    /// Forward edges: stage -> stages it feeds
    successors: HashMap<String, Vec<String>>,

    /// Reverse edges: stage -> stages feeding it
    predecessors: HashMap<String, Vec<String>>,

    /// Every stage on either end of a connection
    nodes: BTreeSet<String>,
}

impl FlowGraph {
    /// Build the graph from flow connections
    pub fn from_flow(flow: &[FlowConnection]) -> Self {
        let mut graph = Self::default();

        for connection in flow {
            graph.nodes.insert(connection.from.clone());
            graph.nodes.insert(connection.to.clone());

            let next = graph.successors.entry(connection.from.clone()).or_default();
            if !next.contains(&connection.to) {
                next.push(connection.to.clone());
            }

            let prev = graph.predecessors.entry(connection.to.clone()).or_default();
            if !prev.contains(&connection.from) {
                prev.push(connection.from.clone());
            }
        }

        graph
    }

    /// Stage names appearing on either end of any connection, sorted
    pub fn connected(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    pub fn contains(&self, stage: &str) -> bool {
        self.nodes.contains(stage)
    }

    /// Immediate downstream stages
    pub fn successors(&self, stage: &str) -> Vec<&str> {
        self.successors
            .get(stage)
            .map(|next| next.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Immediate upstream stages
    pub fn predecessors(&self, stage: &str) -> Vec<&str> {
        self.predecessors
            .get(stage)
            .map(|prev| prev.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every stage reachable from `stage`, breadth-first
    pub fn downstream(&self, stage: &str) -> Vec<String> {
        Self::walk(&self.successors, stage)
    }

    /// Every stage that reaches `stage`, breadth-first
    pub fn upstream(&self, stage: &str) -> Vec<String> {
        Self::walk(&self.predecessors, stage)
    }

    /// Whether data can flow from `from` to `to`
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        self.downstream(from).iter().any(|stage| stage == to)
    }

    fn walk(edges: &HashMap<String, Vec<String>>, start: &str) -> Vec<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut result = Vec::new();

        if let Some(first) = edges.get(start) {
            queue.extend(first.iter().map(String::as_str));
        }

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current.to_string());

            if let Some(next) = edges.get(current) {
                queue.extend(next.iter().map(String::as_str).filter(|s| !visited.contains(s)));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> FlowGraph {
        FlowGraph::from_flow(&[
            FlowConnection::new("l1", "Extract", "Clean"),
            FlowConnection::new("l2", "Clean", "Lookup"),
            FlowConnection::new("l3", "Ref", "Lookup"),
            FlowConnection::new("l4", "Lookup", "Load"),
            FlowConnection::new("l5", "Clean", "Archive"),
        ])
    }

    #[test]
    fn immediate_neighbours() {
        let graph = graph();
        assert_eq!(graph.successors("Clean"), vec!["Lookup", "Archive"]);
        assert_eq!(graph.predecessors("Lookup"), vec!["Clean", "Ref"]);
        assert!(graph.successors("Load").is_empty());
    }

    #[test]
    fn downstream_lineage() {
        let graph = graph();
        assert_eq!(graph.downstream("Extract"), vec!["Clean", "Lookup", "Archive", "Load"]);
        assert!(graph.has_path("Ref", "Load"));
        assert!(!graph.has_path("Load", "Extract"));
    }

    #[test]
    fn upstream_lineage() {
        let mut upstream = graph().upstream("Load");
        upstream.sort();
        assert_eq!(upstream, vec!["Clean", "Extract", "Lookup", "Ref"]);
    }

    #[test]
    fn cycles_terminate() {
        let graph = FlowGraph::from_flow(&[
            FlowConnection::new("a", "A", "B"),
            FlowConnection::new("b", "B", "A"),
        ]);
        assert_eq!(graph.downstream("A"), vec!["B", "A"]);
    }

    #[test]
    fn connected_names() {
        let graph = graph();
        assert_eq!(graph.connected().len(), 6);
        assert!(graph.contains("Archive"));
        assert!(!graph.contains("Orphan"));
    }
}
