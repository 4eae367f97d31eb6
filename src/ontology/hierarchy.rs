//! Ontology hierarchy materialised as an explicit graph
//!
//! Each descriptor sits at one or more tree positions written as
//! `.`-delimited segments (`C14.280.647`). A position's parent is the
//! position with its last segment removed. The hierarchy links every
//! descriptor to the descriptor at its parent position, and every top-level
//! position to [`ONTOLOGY_ROOT`], so the graph engine's BFS can measure
//! hierarchy distances directly.

use crate::graph::Graph;
use rustc_hash::FxHashMap;

/// Synthetic node joining all top-level positions
pub const ONTOLOGY_ROOT: &str = "__root__";

/// One ontology descriptor as supplied by the descriptor parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub id: String,
    pub name: String,
    /// Tree positions, e.g. `["C14.280", "C14.907.489"]`; empty for
    /// descriptors outside every tree
    pub positions: Vec<String>,
}

impl Descriptor {
    /// Create a descriptor from its `|`-joined position string
    pub fn new(id: impl Into<String>, name: impl Into<String>, graph_positions: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            positions: split_positions(graph_positions),
        }
    }
}

/// Split a `|`-joined position string, dropping empty entries
pub fn split_positions(graph_positions: &str) -> Vec<String> {
    graph_positions
        .split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of segments in a position
pub fn position_depth(position: &str) -> usize {
    position.split('.').count()
}

/// The position one level up, if any
pub fn parent_position(position: &str) -> Option<&str> {
    position.rfind('.').map(|idx| &position[..idx])
}

/// Occurrence counts per descriptor identifier
#[derive(Debug, Clone, Default)]
pub struct TermCounts {
    counts: FxHashMap<String, u64>,
}

impl TermCounts {
    /// Create counts with every known identifier at 0
    pub fn with_known<S: AsRef<str>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            counts: ids.into_iter().map(|id| (id.as_ref().to_string(), 0)).collect(),
        }
    }

    /// Count identifier occurrences in comma-separated document rows.
    ///
    /// The first field of each row is a document id and is ignored. Every
    /// identifier in `known` starts at 0; unknown identifiers are added.
    pub fn from_document_rows<S: AsRef<str>>(
        known: impl IntoIterator<Item = S>,
        rows: &str,
    ) -> Self {
        let mut counts = Self::with_known(known);
        for row in rows.lines() {
            for id in row.split(',').skip(1) {
                let id = id.trim();
                if !id.is_empty() {
                    counts.increment(id);
                }
            }
        }
        counts
    }

    /// Record one occurrence
    pub fn increment(&mut self, id: &str) {
        match self.counts.get_mut(id) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(id.to_string(), 1);
            }
        }
    }

    /// Count for an identifier (0 when never seen)
    pub fn get(&self, id: &str) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Number of identifiers tracked
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Descriptors indexed by identifier and by tree position
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    descriptors: Vec<Descriptor>,
    by_id: FxHashMap<String, usize>,
    /// Position -> owning descriptor index
    by_position: FxHashMap<String, usize>,
    /// Parent position -> child descriptor indices, first-seen order
    children: FxHashMap<String, Vec<usize>>,
}

impl Hierarchy {
    /// Index a descriptor list
    pub fn new(descriptors: Vec<Descriptor>) -> Self {
        let mut by_id = FxHashMap::default();
        let mut by_position = FxHashMap::default();
        let mut children: FxHashMap<String, Vec<usize>> = FxHashMap::default();

        for (idx, desc) in descriptors.iter().enumerate() {
            by_id.insert(desc.id.clone(), idx);
            for position in &desc.positions {
                by_position.insert(position.clone(), idx);
                if let Some(parent) = parent_position(position) {
                    let entry = children.entry(parent.to_string()).or_default();
                    if !entry.contains(&idx) {
                        entry.push(idx);
                    }
                }
            }
        }

        Self {
            descriptors,
            by_id,
            by_position,
            children,
        }
    }

    /// Look up a descriptor by identifier
    pub fn get(&self, id: &str) -> Option<&Descriptor> {
        self.by_id.get(id).map(|&idx| &self.descriptors[idx])
    }

    /// Display name for an identifier
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|d| d.name.as_str())
    }

    /// All descriptors in input order
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if there are no descriptors
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Direct children of a descriptor across all its positions.
    ///
    /// A child is a different descriptor located exactly one level below one
    /// of `id`'s positions. Repeats are dropped, first-seen order kept.
    pub fn children(&self, id: &str) -> Vec<&str> {
        let Some(desc) = self.get(id) else {
            return Vec::new();
        };

        let mut out: Vec<&str> = Vec::new();
        for position in &desc.positions {
            let Some(kids) = self.children.get(position) else {
                continue;
            };
            for &kid in kids {
                let kid_id = self.descriptors[kid].id.as_str();
                if kid_id != id && !out.contains(&kid_id) {
                    out.push(kid_id);
                }
            }
        }
        out
    }

    /// Descriptor owning the nearest existing ancestor of `position`
    fn ancestor_owner(&self, position: &str) -> Option<usize> {
        let mut current = parent_position(position);
        while let Some(pos) = current {
            if let Some(&idx) = self.by_position.get(pos) {
                return Some(idx);
            }
            current = parent_position(pos);
        }
        None
    }

    /// Build the ontology graph over descriptor identifiers.
    ///
    /// Every descriptor with a tree position becomes a node. Each position is
    /// linked to the owner of its nearest existing ancestor position, or to
    /// [`ONTOLOGY_ROOT`] when it has none. Descriptors without positions are
    /// left out of the graph.
    pub fn ontology_graph(&self) -> Graph {
        let mut graph = Graph::with_capacity(self.descriptors.len() + 1);
        let root = graph.get_or_create_node(ONTOLOGY_ROOT);
        let ids: Vec<Option<u32>> = self
            .descriptors
            .iter()
            .map(|d| (!d.positions.is_empty()).then(|| graph.get_or_create_node(&d.id)))
            .collect();

        for (idx, desc) in self.descriptors.iter().enumerate() {
            let Some(node) = ids[idx] else {
                continue;
            };
            for position in &desc.positions {
                // An ancestor owner always holds a position, so it has a node
                match self.ancestor_owner(position).and_then(|parent| ids[parent]) {
                    Some(parent) => graph.link(parent, node),
                    None => graph.link(root, node),
                }
            }
        }

        graph
    }

    /// Identifiers frequent enough to be informative.
    ///
    /// A descriptor qualifies when its count exceeds `cutoff` and none of its
    /// direct children has a count below `cutoff`.
    pub fn informative_terms(&self, counts: &TermCounts, cutoff: u64) -> Vec<&str> {
        self.descriptors
            .iter()
            .filter(|d| counts.get(&d.id) > cutoff)
            .filter(|d| {
                self.children(&d.id)
                    .iter()
                    .all(|child| counts.get(child) >= cutoff)
            })
            .map(|d| d.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::shortest_distance;

    fn sample() -> Hierarchy {
        Hierarchy::new(vec![
            Descriptor::new("D1", "Cardiovascular Diseases", "C14"),
            Descriptor::new("D2", "Heart Diseases", "C14.280"),
            Descriptor::new("D3", "Arrhythmias, Cardiac", "C14.280.067"),
            Descriptor::new("D4", "Heart Failure", "C14.280.434|C14.907.489"),
            Descriptor::new("D5", "Vascular Diseases", "C14.907"),
            Descriptor::new("D6", "Female", ""),
            Descriptor::new("D7", "Neoplasms", "C04"),
        ])
    }

    #[test]
    fn test_position_helpers() {
        assert_eq!(position_depth("C14.280.067"), 3);
        assert_eq!(parent_position("C14.280.067"), Some("C14.280"));
        assert_eq!(parent_position("C14"), None);
        assert_eq!(split_positions("A01|| A02 "), vec!["A01", "A02"]);
    }

    #[test]
    fn test_children() {
        let hierarchy = sample();
        assert_eq!(hierarchy.children("D2"), vec!["D3", "D4"]);
        assert_eq!(hierarchy.children("D5"), vec!["D4"]);
        assert_eq!(hierarchy.children("D1"), vec!["D2", "D5"]);
        assert!(hierarchy.children("D6").is_empty());
        assert!(hierarchy.children("missing").is_empty());
    }

    #[test]
    fn test_ontology_graph_distances() {
        let hierarchy = sample();
        let graph = hierarchy.ontology_graph();

        assert_eq!(shortest_distance(&graph, "D1", "D2").unwrap(), 1);
        assert_eq!(shortest_distance(&graph, "D3", "D4").unwrap(), 2);
        // D4 also hangs under D5, giving a second route to D1
        assert_eq!(shortest_distance(&graph, "D4", "D1").unwrap(), 2);
        // Separate trees meet at the root
        assert_eq!(shortest_distance(&graph, "D7", "D2").unwrap(), 3);
        assert!(shortest_distance(&graph, "D6", "D1").is_err());
    }

    #[test]
    fn test_descriptor_without_position_has_no_node() {
        let graph = sample().ontology_graph();
        assert!(!graph.contains("D6"));
        assert!(graph.contains("D7"));
        // Six positioned descriptors plus the root
        assert_eq!(graph.node_count(), 7);
    }

    #[test]
    fn test_missing_intermediate_links_to_nearest_ancestor() {
        let hierarchy = Hierarchy::new(vec![
            Descriptor::new("A", "a", "X01"),
            Descriptor::new("C", "c", "X01.001.002"),
        ]);
        let graph = hierarchy.ontology_graph();
        assert_eq!(shortest_distance(&graph, "A", "C").unwrap(), 1);
    }

    #[test]
    fn test_informative_terms() {
        let hierarchy = sample();
        let mut counts = TermCounts::with_known(hierarchy.descriptors().iter().map(|d| &d.id));
        for (id, n) in [("D1", 50), ("D2", 20), ("D3", 4), ("D4", 30), ("D5", 12), ("D7", 11)] {
            for _ in 0..n {
                counts.increment(id);
            }
        }

        // D2 has child D3 below the cutoff; D3 is not above it
        assert_eq!(hierarchy.informative_terms(&counts, 10), vec!["D1", "D4", "D5", "D7"]);
    }

    #[test]
    fn test_term_counts_unknown_ids() {
        let mut counts = TermCounts::with_known(["D1"]);
        counts.increment("D9");
        counts.increment("D9");
        assert_eq!(counts.get("D1"), 0);
        assert_eq!(counts.get("D9"), 2);
        assert_eq!(counts.get("nope"), 0);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_term_counts_from_document_rows() {
        let rows = "doc1,D1,D2\ndoc2,D2\n\ndoc3,D9, D2\n";
        let counts = TermCounts::from_document_rows(["D1", "D2", "D3"], rows);
        assert_eq!(counts.get("D1"), 1);
        assert_eq!(counts.get("D2"), 3);
        assert_eq!(counts.get("D3"), 0);
        assert_eq!(counts.get("D9"), 1);
        // Document ids are never counted
        assert_eq!(counts.get("doc1"), 0);
        assert_eq!(counts.len(), 4);
    }
}
