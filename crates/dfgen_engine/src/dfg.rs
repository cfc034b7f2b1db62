//! The generated data-flow graph.
//!
//! Nodes are the fabric nodes an operation is placed on, so placement is
//! implicit: a node's identity is its location.

use dfgen_fabric::FabricNode;
use petgraph::algo::{connected_components, has_path_connecting, toposort};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::HashMap;

/// A directed data-flow graph over fabric nodes.
///
/// Iteration follows insertion order, which keeps naming and export
/// deterministic for a given random stream.
#[derive(Debug, Clone, Default)]
pub struct Dfg {
    graph: DiGraphMap<FabricNode, ()>,
}

impl Dfg {
    /// Creates an empty DFG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Re-adding an existing node is a no-op.
    pub fn add_node(&mut self, node: FabricNode) {
        self.graph.add_node(node);
    }

    /// Adds an edge and both endpoints. Returns `true` if the edge is new.
    pub fn add_edge(&mut self, from: FabricNode, to: FabricNode) -> bool {
        self.graph.add_edge(from, to, ()).is_none()
    }

    /// Adds every node of `path` and the edges between consecutive nodes.
    pub fn add_path(&mut self, path: &[FabricNode]) {
        for &node in path {
            self.add_node(node);
        }
        for pair in path.windows(2) {
            self.add_edge(pair[0], pair[1]);
        }
    }

    /// Returns whether `node` is in the DFG.
    pub fn contains_node(&self, node: FabricNode) -> bool {
        self.graph.contains_node(node)
    }

    /// Returns whether the edge `from -> to` exists.
    pub fn has_edge(&self, from: FabricNode, to: FabricNode) -> bool {
        self.graph.contains_edge(from, to)
    }

    /// Number of operations.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of data dependencies.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = FabricNode> + '_ {
        self.graph.nodes()
    }

    /// Iterates over edges as `(from, to)`.
    pub fn edges(&self) -> impl Iterator<Item = (FabricNode, FabricNode)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| (a, b))
    }

    /// Number of incoming edges.
    pub fn in_degree(&self, node: FabricNode) -> usize {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .count()
    }

    /// Number of outgoing edges.
    pub fn out_degree(&self, node: FabricNode) -> usize {
        self.graph
            .neighbors_directed(node, Direction::Outgoing)
            .count()
    }

    /// Returns whether a directed path leads from `from` to `to`.
    pub fn has_path(&self, from: FabricNode, to: FabricNode) -> bool {
        self.contains_node(from)
            && self.contains_node(to)
            && has_path_connecting(&self.graph, from, to, None)
    }

    /// Returns a topological order, or `None` if the DFG has a cycle.
    pub fn topological_order(&self) -> Option<Vec<FabricNode>> {
        toposort(&self.graph, None).ok()
    }

    /// Groups nodes by longest-path depth from a source.
    ///
    /// Level 0 holds the sources. Returns `None` if the DFG has a cycle.
    pub fn levels(&self) -> Option<Vec<Vec<FabricNode>>> {
        let order = self.topological_order()?;
        let mut depth: HashMap<FabricNode, usize> = HashMap::new();
        let mut levels: Vec<Vec<FabricNode>> = Vec::new();
        for node in order {
            let level = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .filter_map(|pred| depth.get(&pred))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(node, level);
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(node);
        }
        Some(levels)
    }

    /// Returns whether the DFG is weakly connected. An empty DFG is not.
    pub fn is_weakly_connected(&self) -> bool {
        self.graph.node_count() > 0 && connected_components(&self.graph) == 1
    }

    /// Borrows the underlying petgraph map.
    pub fn as_graphmap(&self) -> &DiGraphMap<FabricNode, ()> {
        &self.graph
    }
}
