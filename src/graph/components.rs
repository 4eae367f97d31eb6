//! Connected component discovery
//!
//! Components partition the graph: every node lands in exactly one of them.
//! Each component is returned as the induced subgraph over its members.

use super::builder::Graph;
use std::collections::VecDeque;

/// Collect every node reachable from `start` by breadth-first traversal.
///
/// The returned IDs are in visit order, `start` first.
pub fn reachable_from(graph: &Graph, start: u32) -> Vec<u32> {
    let mut visited = vec![false; graph.node_count()];
    collect_reachable(graph, start, &mut visited)
}

fn collect_reachable(graph: &Graph, start: u32, visited: &mut [bool]) -> Vec<u32> {
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);
    visited[start as usize] = true;

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &nbr in graph.neighbors(node) {
            if !visited[nbr as usize] {
                visited[nbr as usize] = true;
                queue.push_back(nbr);
            }
        }
    }

    order
}

/// Split the graph into its connected components.
///
/// Components are discovered in node insertion order; each one is the
/// restriction of the adjacency lists to its members.
pub fn connected_components(graph: &Graph) -> Vec<Graph> {
    let mut visited = vec![false; graph.node_count()];
    let mut components = Vec::new();

    for (id, _) in graph.nodes() {
        if visited[id as usize] {
            continue;
        }
        let members = collect_reachable(graph, id, &mut visited);
        components.push(graph.induced(&members));
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_two_components() {
        let graph = Graph::from_edges([("A", "B"), ("B", "C"), ("D", "E")]);
        let components = connected_components(&graph);

        assert_eq!(components.len(), 2);
        let first: FxHashSet<&str> = components[0].labels().collect();
        let second: FxHashSet<&str> = components[1].labels().collect();
        assert_eq!(first, ["A", "B", "C"].into_iter().collect());
        assert_eq!(second, ["D", "E"].into_iter().collect());
        assert_eq!(components[0].edge_count(), 2);
        assert_eq!(components[1].edge_count(), 1);
    }

    #[test]
    fn test_isolated_node_is_own_component() {
        let mut graph = Graph::from_edges([("a", "b")]);
        graph.get_or_create_node("z");
        let components = connected_components(&graph);

        assert_eq!(components.len(), 2);
        assert_eq!(components[1].node_count(), 1);
        assert!(components[1].contains("z"));
    }

    #[test]
    fn test_empty_graph() {
        assert!(connected_components(&Graph::new()).is_empty());
    }

    #[test]
    fn test_reachable_from_visits_start_first() {
        let graph = Graph::from_edges([("a", "b"), ("b", "c"), ("x", "y")]);
        let start = graph.get_node_id("b").unwrap();
        let reached = reachable_from(&graph, start);

        assert_eq!(reached[0], start);
        assert_eq!(reached.len(), 3);
    }
}
