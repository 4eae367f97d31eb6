//! Breadth-first shortest-path distance

use super::builder::Graph;
use crate::errors::{Result, ValidationError};

/// Number of edges on a shortest path from `source` to `sink`.
///
/// Expands the search one frontier at a time and stops as soon as `sink`
/// shows up as a neighbour of the current frontier. `source == sink` is 0
/// without traversal. An unknown endpoint or a sink outside the source's
/// component is an [`ValidationError::UnreachableNode`].
pub fn shortest_distance(graph: &Graph, source: &str, sink: &str) -> Result<usize> {
    if source == sink {
        return Ok(0);
    }

    let (start, target) = match (graph.get_node_id(source), graph.get_node_id(sink)) {
        (Some(s), Some(t)) => (s, t),
        _ => return Err(ValidationError::unreachable(source, sink)),
    };

    let mut visited = vec![false; graph.node_count()];
    visited[start as usize] = true;
    let mut frontier = vec![start];
    let mut distance = 0;

    while !frontier.is_empty() {
        distance += 1;
        let mut next = Vec::new();
        for &node in &frontier {
            for &nbr in graph.neighbors(node) {
                if nbr == target {
                    return Ok(distance);
                }
                if !visited[nbr as usize] {
                    visited[nbr as usize] = true;
                    next.push(nbr);
                }
            }
        }
        frontier = next;
    }

    Err(ValidationError::unreachable(source, sink))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Graph {
        Graph::from_edges([("a", "b"), ("b", "c"), ("c", "d"), ("x", "y")])
    }

    #[test]
    fn test_self_distance_is_zero() {
        let graph = chain();
        assert_eq!(shortest_distance(&graph, "c", "c").unwrap(), 0);
        // No traversal happens, so even unknown nodes are at distance 0 from themselves.
        assert_eq!(shortest_distance(&graph, "nowhere", "nowhere").unwrap(), 0);
    }

    #[test]
    fn test_chain_distances() {
        let graph = chain();
        assert_eq!(shortest_distance(&graph, "a", "b").unwrap(), 1);
        assert_eq!(shortest_distance(&graph, "a", "c").unwrap(), 2);
        assert_eq!(shortest_distance(&graph, "a", "d").unwrap(), 3);
        assert_eq!(shortest_distance(&graph, "d", "a").unwrap(), 3);
    }

    #[test]
    fn test_shortcut_is_taken() {
        let mut graph = chain();
        graph.add_edge("a", "d");
        assert_eq!(shortest_distance(&graph, "a", "d").unwrap(), 1);
        assert_eq!(shortest_distance(&graph, "b", "d").unwrap(), 2);
    }

    #[test]
    fn test_unreachable_is_error() {
        let graph = chain();
        let err = shortest_distance(&graph, "a", "x").unwrap_err();
        assert_eq!(err, ValidationError::unreachable("a", "x"));
    }

    #[test]
    fn test_unknown_node_is_error() {
        let graph = chain();
        assert!(matches!(
            shortest_distance(&graph, "a", "zzz"),
            Err(ValidationError::UnreachableNode { .. })
        ));
    }
}
