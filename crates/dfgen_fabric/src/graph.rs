//! Directed physical connectivity graph of a fabric.
//!
//! A [`FabricGraph`] holds one node per placement slot and one directed edge
//! per physical one-hop connection usable in a single generation step. It is
//! built once by a fabric constructor and only read afterwards.

use crate::node::FabricNode;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

/// Directed connectivity graph over [`FabricNode`]s.
#[derive(Debug, Clone, Default)]
pub struct FabricGraph {
    inner: DiGraphMap<FabricNode, ()>,
}

impl FabricGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: FabricNode) {
        self.inner.add_node(node);
    }

    /// Adds a directed edge, inserting missing endpoints.
    ///
    /// Returns `true` if the edge was not present before.
    pub fn add_edge(&mut self, from: FabricNode, to: FabricNode) -> bool {
        self.inner.add_edge(from, to, ()).is_none()
    }

    /// Returns whether the node belongs to the fabric.
    pub fn contains_node(&self, node: FabricNode) -> bool {
        self.inner.contains_node(node)
    }

    /// Returns whether the directed edge `from -> to` exists.
    pub fn has_edge(&self, from: FabricNode, to: FabricNode) -> bool {
        self.inner.contains_edge(from, to)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = FabricNode> + '_ {
        self.inner.nodes()
    }

    /// Iterates over all directed edges as `(from, to)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (FabricNode, FabricNode)> + '_ {
        self.inner.all_edges().map(|(a, b, _)| (a, b))
    }

    /// Iterates over the out-neighbors of `node`.
    pub fn successors(&self, node: FabricNode) -> impl Iterator<Item = FabricNode> + '_ {
        self.inner.neighbors_directed(node, Direction::Outgoing)
    }

    /// Iterates over the in-neighbors of `node`.
    pub fn predecessors(&self, node: FabricNode) -> impl Iterator<Item = FabricNode> + '_ {
        self.inner.neighbors_directed(node, Direction::Incoming)
    }

    /// Iterates over neighbors of `node` in the given direction.
    pub fn neighbors(
        &self,
        node: FabricNode,
        direction: Direction,
    ) -> impl Iterator<Item = FabricNode> + '_ {
        self.inner.neighbors_directed(node, direction)
    }

    /// Returns the number of out-neighbors of `node`.
    pub fn out_degree(&self, node: FabricNode) -> usize {
        self.successors(node).count()
    }

    /// Borrows the underlying petgraph map for use with `petgraph::algo`.
    pub fn as_graphmap(&self) -> &DiGraphMap<FabricNode, ()> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(r: u32, c: u32) -> FabricNode {
        FabricNode::qca(r, c)
    }

    #[test]
    fn add_edge_reports_novelty() {
        let mut g = FabricGraph::new();
        assert!(g.add_edge(n(0, 0), n(0, 1)));
        assert!(!g.add_edge(n(0, 0), n(0, 1)));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn edges_are_directed() {
        let mut g = FabricGraph::new();
        g.add_edge(n(0, 0), n(1, 0));
        assert!(g.has_edge(n(0, 0), n(1, 0)));
        assert!(!g.has_edge(n(1, 0), n(0, 0)));
        assert_eq!(g.successors(n(0, 0)).collect::<Vec<_>>(), vec![n(1, 0)]);
        assert_eq!(g.predecessors(n(1, 0)).collect::<Vec<_>>(), vec![n(0, 0)]);
        assert_eq!(g.successors(n(1, 0)).count(), 0);
    }

    #[test]
    fn isolated_nodes_are_kept() {
        let mut g = FabricGraph::new();
        g.add_node(n(3, 3));
        assert!(g.contains_node(n(3, 3)));
        assert_eq!(g.out_degree(n(3, 3)), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn edges_iterator_matches_count() {
        let mut g = FabricGraph::new();
        g.add_edge(n(0, 0), n(0, 1));
        g.add_edge(n(0, 1), n(0, 2));
        g.add_edge(n(0, 2), n(0, 0));
        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges.len(), g.edge_count());
        assert!(edges.contains(&(n(0, 2), n(0, 0))));
    }
}
