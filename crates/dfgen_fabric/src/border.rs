//! Perimeter node sets used as I/O anchors.

use crate::node::FabricNode;
use std::collections::BTreeSet;

/// The set of fabric nodes lying on the physical grid perimeter.
///
/// For CGRA fabrics every time slot of a perimeter PE is included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderSet {
    nodes: BTreeSet<FabricNode>,
}

impl BorderSet {
    /// Computes the perimeter of a `rows x cols` grid.
    ///
    /// With `time_slots = Some(ii)` the nodes are CGRA slots for every time in
    /// `[0, ii)`; with `None` they are QCA cells.
    pub fn perimeter(rows: u32, cols: u32, time_slots: Option<u32>) -> Self {
        let mut nodes = BTreeSet::new();
        for r in 0..rows {
            for c in 0..cols {
                let on_edge = r == 0 || c == 0 || r + 1 == rows || c + 1 == cols;
                if !on_edge {
                    continue;
                }
                match time_slots {
                    Some(ii) => nodes.extend((0..ii).map(|t| FabricNode::cgra(r, c, t))),
                    None => {
                        nodes.insert(FabricNode::qca(r, c));
                    }
                }
            }
        }
        Self { nodes }
    }

    /// Returns whether `node` is a border node.
    pub fn contains(&self, node: FabricNode) -> bool {
        self.nodes.contains(&node)
    }

    /// Number of border nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over border nodes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = FabricNode> + '_ {
        self.nodes.iter().copied()
    }

    /// Returns the border node with the smallest spatial Manhattan distance to
    /// `node`. Ties resolve to the smallest node in `(row, col, time)` order.
    pub fn nearest(&self, node: FabricNode) -> Option<FabricNode> {
        self.iter().min_by_key(|b| b.manhattan(node))
    }
}

impl FromIterator<FabricNode> for BorderSet {
    fn from_iter<I: IntoIterator<Item = FabricNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
