//! Undirected graph over string identifiers
//!
//! Identifiers are interned to dense `u32` ids on first sight, and each node
//! keeps its neighbours in first-seen order with duplicates dropped. The same
//! structure backs both the extraction graph and the ontology graph.

use crate::errors::{Result, ValidationError};
use rustc_hash::FxHashMap;

/// A node in the graph
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// The identifier for this node
    pub label: String,
    /// Neighbour node IDs, first-seen order, no duplicates
    pub neighbors: Vec<u32>,
}

impl GraphNode {
    /// Create a new node
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            neighbors: Vec::new(),
        }
    }
}

/// An undirected, unweighted adjacency-list graph
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Maps identifier -> node ID
    label_to_id: FxHashMap<String, u32>,
    /// Node storage
    nodes: Vec<GraphNode>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with pre-allocated capacity
    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            label_to_id: FxHashMap::with_capacity_and_hasher(node_capacity, Default::default()),
            nodes: Vec::with_capacity(node_capacity),
        }
    }

    /// Build a graph from identifier pairs, inserting every edge both ways
    pub fn from_edges<I, A, B>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.add_edge(a.as_ref(), b.as_ref());
        }
        graph
    }

    /// Parse a tab-separated edge list (`node_a\tnode_b` per line).
    ///
    /// Fields are whitespace-trimmed and blank lines are skipped. Any other
    /// line with fewer than two fields is a format error.
    pub fn from_edge_list(text: &str) -> Result<Self> {
        let mut graph = Self::new();
        for (idx, line) in text.lines().enumerate() {
            if let Some((a, b)) = parse_edge_line(line, idx + 1)? {
                graph.add_edge(a, b);
            }
        }
        Ok(graph)
    }

    /// Get or create a node for the given identifier, returning its ID
    pub fn get_or_create_node(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.label_to_id.get(label) {
            return id;
        }

        let id = self.nodes.len() as u32;
        self.label_to_id.insert(label.to_string(), id);
        self.nodes.push(GraphNode::new(label));
        id
    }

    /// Add an undirected edge between two identifiers, creating nodes as needed
    pub fn add_edge(&mut self, a: &str, b: &str) {
        let id_a = self.get_or_create_node(a);
        let id_b = self.get_or_create_node(b);
        self.link(id_a, id_b);
    }

    /// Connect two existing nodes in both directions
    ///
    /// Self-loops and repeated edges are ignored.
    pub fn link(&mut self, from: u32, to: u32) {
        if from == to {
            return;
        }

        if let Some(node) = self.nodes.get_mut(from as usize) {
            if !node.neighbors.contains(&to) {
                node.neighbors.push(to);
            }
        }
        if let Some(node) = self.nodes.get_mut(to as usize) {
            if !node.neighbors.contains(&from) {
                node.neighbors.push(from);
            }
        }
    }

    /// Restrict the graph to `members`, keeping only edges between them.
    ///
    /// Node IDs in the returned graph are renumbered in `members` order.
    pub fn induced(&self, members: &[u32]) -> Graph {
        let mut sub = Graph::with_capacity(members.len());
        for &id in members {
            sub.get_or_create_node(&self.nodes[id as usize].label);
        }
        for &id in members {
            let node = &self.nodes[id as usize];
            let from = sub.label_to_id[&node.label];
            for &nbr in &node.neighbors {
                if let Some(&to) = sub.label_to_id.get(&self.nodes[nbr as usize].label) {
                    sub.link(from, to);
                }
            }
        }
        sub
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges (counting each undirected edge once)
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    /// Get a node by ID
    pub fn get_node(&self, id: u32) -> Option<&GraphNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by identifier
    pub fn get_node_id(&self, label: &str) -> Option<u32> {
        self.label_to_id.get(label).copied()
    }

    /// Get the identifier for a node ID
    pub fn get_label(&self, id: u32) -> Option<&str> {
        self.nodes.get(id as usize).map(|n| n.label.as_str())
    }

    /// Check whether an identifier is a node of the graph
    pub fn contains(&self, label: &str) -> bool {
        self.label_to_id.contains_key(label)
    }

    /// Neighbour IDs of a node (empty for unknown IDs)
    pub fn neighbors(&self, id: u32) -> &[u32] {
        self.nodes
            .get(id as usize)
            .map(|n| n.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Neighbour identifiers of a node, if it exists
    pub fn neighbor_labels(&self, label: &str) -> Option<Vec<&str>> {
        let id = self.get_node_id(label)?;
        Some(
            self.neighbors(id)
                .iter()
                .map(|&n| self.nodes[n as usize].label.as_str())
                .collect(),
        )
    }

    /// Iterate over all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &GraphNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }

    /// Iterate over all identifiers in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.label.as_str())
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Split one edge-list line into its two trimmed fields.
///
/// Returns `Ok(None)` for blank lines. Fields past the second are ignored.
pub fn parse_edge_line(line: &str, line_no: usize) -> Result<Option<(&str, &str)>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let mut fields = line.split('\t').map(str::trim);
    match (fields.next(), fields.next()) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        _ => Err(ValidationError::format(
            line_no,
            format!("expected 2 tab-separated fields in '{}'", line.trim()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_insertion() {
        let graph = Graph::from_edges([("a", "b"), ("b", "c")]);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.neighbor_labels("b").unwrap(), vec!["a", "c"]);
        assert_eq!(graph.neighbor_labels("a").unwrap(), vec!["b"]);
    }

    #[test]
    fn test_duplicate_edges_dedup_first_seen() {
        let graph = Graph::from_edges([("a", "c"), ("a", "b"), ("c", "a"), ("a", "c")]);

        assert_eq!(graph.neighbor_labels("a").unwrap(), vec!["c", "b"]);
        assert_eq!(graph.neighbor_labels("c").unwrap(), vec!["a"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_no_self_loops() {
        let graph = Graph::from_edges([("a", "a")]);

        assert_eq!(graph.node_count(), 1);
        assert!(graph.neighbor_labels("a").unwrap().is_empty());
    }

    #[test]
    fn test_from_edge_list_trims_fields() {
        let text = "heart \t disease\n\n lung\tdisease \n";
        let graph = Graph::from_edge_list(text).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert!(graph.contains("heart"));
        assert!(graph.contains("lung"));
        assert_eq!(graph.neighbor_labels("disease").unwrap(), vec!["heart", "lung"]);
    }

    #[test]
    fn test_from_edge_list_rejects_single_field() {
        let text = "a\tb\nlonely\n";
        let err = Graph::from_edge_list(text).unwrap_err();

        assert!(matches!(err, ValidationError::Format { line: 2, .. }));
    }

    #[test]
    fn test_induced_subgraph() {
        let graph = Graph::from_edges([("a", "b"), ("b", "c"), ("c", "d")]);
        let ids: Vec<u32> = ["b", "c", "d"]
            .iter()
            .map(|l| graph.get_node_id(l).unwrap())
            .collect();
        let sub = graph.induced(&ids);

        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 2);
        assert!(!sub.contains("a"));
        assert_eq!(sub.neighbor_labels("b").unwrap(), vec!["c"]);
    }
}
