//! Breadth-first shortest-path trees.
//!
//! The fabric graph is unweighted, so BFS gives shortest paths directly.
//! A [`SearchTree`] answers many "path from the root to X" queries after a
//! single traversal, which is how the fan-out and fan-in rules scan their
//! candidate lists.

use super::Path;
use dfgen_fabric::{FabricGraph, FabricNode};
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};

/// BFS tree rooted at one node, bounded by a maximum depth.
#[derive(Debug, Clone)]
pub struct SearchTree {
    root: FabricNode,
    direction: Direction,
    parent: HashMap<FabricNode, FabricNode>,
    depth: HashMap<FabricNode, usize>,
}

impl SearchTree {
    /// Runs BFS from `root`.
    ///
    /// With [`Direction::Outgoing`] the tree follows edges forward and
    /// [`path_to`](Self::path_to) returns `root -> .. -> node`. With
    /// [`Direction::Incoming`] it follows edges backward and returns
    /// `node -> .. -> root`. Nodes for which `blocked` holds are never entered
    /// (the root is exempt), and no node deeper than `max_len` is reached.
    pub fn build(
        graph: &FabricGraph,
        root: FabricNode,
        direction: Direction,
        max_len: usize,
        blocked: impl Fn(FabricNode) -> bool,
    ) -> Self {
        let mut tree = Self {
            root,
            direction,
            parent: HashMap::new(),
            depth: HashMap::from([(root, 0)]),
        };
        if !graph.contains_node(root) {
            tree.depth.clear();
            return tree;
        }
        tree.explore(graph, max_len, &blocked, None);
        tree
    }

    /// BFS loop. Stops early once `stop_at` is discovered.
    fn explore(
        &mut self,
        graph: &FabricGraph,
        max_len: usize,
        blocked: &impl Fn(FabricNode) -> bool,
        stop_at: Option<FabricNode>,
    ) {
        let mut queue = VecDeque::from([self.root]);
        while let Some(node) = queue.pop_front() {
            let d = self.depth[&node];
            if d >= max_len {
                continue;
            }
            for next in graph.neighbors(node, self.direction) {
                if self.depth.contains_key(&next) || blocked(next) {
                    continue;
                }
                self.depth.insert(next, d + 1);
                self.parent.insert(next, node);
                if Some(next) == stop_at {
                    return;
                }
                queue.push_back(next);
            }
        }
    }

    /// The root node.
    pub fn root(&self) -> FabricNode {
        self.root
    }

    /// Distance in edges from the root, if reached.
    pub fn distance(&self, node: FabricNode) -> Option<usize> {
        self.depth.get(&node).copied()
    }

    /// Returns the tree path between the root and `node` in signal direction.
    pub fn path_to(&self, node: FabricNode) -> Option<Path> {
        if !self.depth.contains_key(&node) {
            return None;
        }
        let mut path = vec![node];
        let mut current = node;
        while let Some(&prev) = self.parent.get(&current) {
            path.push(prev);
            current = prev;
        }
        if self.direction == Direction::Outgoing {
            path.reverse();
        }
        Some(path)
    }
}

/// Finds one shortest path `source -> target` of at most `max_len` edges.
///
/// Interior nodes must not be `blocked`; both endpoints are exempt.
pub fn shortest_path(
    graph: &FabricGraph,
    source: FabricNode,
    target: FabricNode,
    max_len: usize,
    blocked: impl Fn(FabricNode) -> bool,
) -> Option<Path> {
    if !graph.contains_node(source) || !graph.contains_node(target) {
        return None;
    }
    if source == target {
        return Some(vec![source]);
    }
    let mut tree = SearchTree {
        root: source,
        direction: Direction::Outgoing,
        parent: HashMap::new(),
        depth: HashMap::from([(source, 0)]),
    };
    let blocked = |node: FabricNode| node != target && blocked(node);
    tree.explore(graph, max_len, &blocked, Some(target));
    tree.path_to(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfgen_fabric::{CgraFabric, Fabric, Interconnect, QcaFabric, QcaScheme};

    fn grid(rows: u32, cols: u32) -> CgraFabric {
        CgraFabric::new(rows, cols, Interconnect::MESH, 1).unwrap()
    }

    fn n(r: u32, c: u32) -> FabricNode {
        FabricNode::cgra(r, c, 0)
    }

    #[test]
    fn straight_line_path() {
        let fabric = grid(1, 4);
        let path = shortest_path(fabric.graph(), n(0, 0), n(0, 3), 10, |_| false).unwrap();
        assert_eq!(path, vec![n(0, 0), n(0, 1), n(0, 2), n(0, 3)]);
    }

    #[test]
    fn respects_max_len() {
        let fabric = grid(1, 4);
        assert!(shortest_path(fabric.graph(), n(0, 0), n(0, 3), 2, |_| false).is_none());
        assert!(shortest_path(fabric.graph(), n(0, 0), n(0, 3), 3, |_| false).is_some());
    }

    #[test]
    fn blocked_interior_forces_detour() {
        let fabric = grid(2, 3);
        let path =
            shortest_path(fabric.graph(), n(0, 0), n(0, 2), 10, |v| v == n(0, 1)).unwrap();
        assert_eq!(path.len(), 5);
        assert!(!path.contains(&n(0, 1)));
    }

    #[test]
    fn blocked_endpoints_are_exempt() {
        let fabric = grid(1, 3);
        let path =
            shortest_path(fabric.graph(), n(0, 0), n(0, 2), 10, |v| v != n(0, 1)).unwrap();
        assert_eq!(path, vec![n(0, 0), n(0, 1), n(0, 2)]);
    }

    #[test]
    fn unreachable_target() {
        let fabric = QcaFabric::new(3, 3, QcaScheme::TwoDDWave).unwrap();
        let path = shortest_path(
            fabric.graph(),
            FabricNode::qca(2, 2),
            FabricNode::qca(0, 0),
            10,
            |_| false,
        );
        assert!(path.is_none());
    }

    #[test]
    fn incoming_tree_yields_forward_paths() {
        let fabric = QcaFabric::new(3, 3, QcaScheme::TwoDDWave).unwrap();
        let root = FabricNode::qca(2, 2);
        let tree = SearchTree::build(fabric.graph(), root, Direction::Incoming, 10, |_| false);
        let path = tree.path_to(FabricNode::qca(0, 0)).unwrap();
        assert_eq!(path.first(), Some(&FabricNode::qca(0, 0)));
        assert_eq!(path.last(), Some(&root));
        assert_eq!(path.len(), 5);
        for pair in path.windows(2) {
            assert!(fabric.graph().has_edge(pair[0], pair[1]));
        }
    }

    #[test]
    fn tree_distances() {
        let fabric = grid(3, 3);
        let tree = SearchTree::build(fabric.graph(), n(0, 0), Direction::Outgoing, 2, |_| false);
        assert_eq!(tree.distance(n(0, 0)), Some(0));
        assert_eq!(tree.distance(n(1, 1)), Some(2));
        assert_eq!(tree.distance(n(2, 2)), None);
        assert_eq!(tree.root(), n(0, 0));
    }
}
