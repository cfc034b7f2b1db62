//! Path search over a fabric graph with claimed nodes excluded.
//!
//! Every search takes a `blocked` predicate describing nodes that may not be
//! entered (typically the nodes already used by the DFG). The search root and
//! the requested target are always exempt, so a path may start or end on a
//! used node but never pass through one. A failed search is an ordinary
//! outcome and is reported as `None` or an empty list.

mod bfs;
mod dag;

pub use bfs::{shortest_path, SearchTree};
pub use dag::{
    all_shortest_paths, ShortestPathDag, DISJOINT_SELECTION_ROUNDS, MAX_ENUMERATED_PATHS,
};

use dfgen_fabric::FabricNode;

/// A path of fabric nodes, endpoints included, in signal direction.
pub type Path = Vec<FabricNode>;

/// Number of edges on `path`.
pub fn path_length(path: &[FabricNode]) -> usize {
    path.len().saturating_sub(1)
}
