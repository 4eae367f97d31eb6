//! Graph engine: adjacency construction, components and BFS distance.

pub mod builder;
pub mod components;
pub mod distance;

pub use builder::{parse_edge_line, Graph, GraphNode};
pub use components::{connected_components, reachable_from};
pub use distance::shortest_distance;
