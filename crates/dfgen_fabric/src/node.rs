//! Coordinates of physical fabric slots.
//!
//! A [`FabricNode`] identifies one placement location in a fabric. CGRA slots
//! carry a time coordinate in `[0, II)`; QCA cells are purely spatial. Nodes
//! are `Copy`, totally ordered by `(row, col, time)`, and
//! `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One physical placement slot of a fabric.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FabricNode {
    /// A CGRA processing element at one time slot of the initiation interval.
    Slot {
        /// Grid row.
        row: u32,
        /// Grid column.
        col: u32,
        /// Time slot in `[0, II)`.
        time: u32,
    },
    /// A QCA cell.
    Cell {
        /// Grid row.
        row: u32,
        /// Grid column.
        col: u32,
    },
}

impl FabricNode {
    /// Creates a CGRA slot at `(row, col, time)`.
    pub fn cgra(row: u32, col: u32, time: u32) -> Self {
        Self::Slot { row, col, time }
    }

    /// Creates a QCA cell at `(row, col)`.
    pub fn qca(row: u32, col: u32) -> Self {
        Self::Cell { row, col }
    }

    /// Returns the grid row.
    pub fn row(self) -> u32 {
        match self {
            Self::Slot { row, .. } | Self::Cell { row, .. } => row,
        }
    }

    /// Returns the grid column.
    pub fn col(self) -> u32 {
        match self {
            Self::Slot { col, .. } | Self::Cell { col, .. } => col,
        }
    }

    /// Returns the time slot, or `None` for nodes without a time dimension.
    pub fn time(self) -> Option<u32> {
        match self {
            Self::Slot { time, .. } => Some(time),
            Self::Cell { .. } => None,
        }
    }

    /// Returns the coordinates as a flat list: `[row, col, time]` or `[row, col]`.
    pub fn coords(self) -> Vec<u32> {
        match self {
            Self::Slot { row, col, time } => vec![row, col, time],
            Self::Cell { row, col } => vec![row, col],
        }
    }

    /// Spatial Manhattan distance, ignoring the time coordinate.
    pub fn manhattan(self, other: Self) -> u32 {
        self.row().abs_diff(other.row()) + self.col().abs_diff(other.col())
    }
}

impl fmt::Display for FabricNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot { row, col, time } => write!(f, "({row}, {col}, {time})"),
            Self::Cell { row, col } => write!(f, "({row}, {col})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn accessors() {
        let n = FabricNode::cgra(2, 3, 1);
        assert_eq!(n.row(), 2);
        assert_eq!(n.col(), 3);
        assert_eq!(n.time(), Some(1));

        let c = FabricNode::qca(4, 5);
        assert_eq!(c.row(), 4);
        assert_eq!(c.col(), 5);
        assert_eq!(c.time(), None);
    }

    #[test]
    fn coords_flatten() {
        assert_eq!(FabricNode::cgra(1, 2, 0).coords(), vec![1, 2, 0]);
        assert_eq!(FabricNode::qca(3, 0).coords(), vec![3, 0]);
    }

    #[test]
    fn manhattan_ignores_time() {
        let a = FabricNode::cgra(0, 0, 0);
        let b = FabricNode::cgra(2, 3, 1);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(b.manhattan(a), 5);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn ordering_is_row_major() {
        let set: BTreeSet<_> = [
            FabricNode::cgra(1, 0, 0),
            FabricNode::cgra(0, 1, 1),
            FabricNode::cgra(0, 1, 0),
        ]
        .into_iter()
        .collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![
                FabricNode::cgra(0, 1, 0),
                FabricNode::cgra(0, 1, 1),
                FabricNode::cgra(1, 0, 0),
            ]
        );
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", FabricNode::cgra(1, 1, 0)), "(1, 1, 0)");
        assert_eq!(format!("{}", FabricNode::qca(0, 3)), "(0, 3)");
    }

    #[test]
    fn serde_roundtrip() {
        let slot = FabricNode::cgra(1, 2, 3);
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(serde_json::from_str::<FabricNode>(&json).unwrap(), slot);

        let cell = FabricNode::qca(7, 8);
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(serde_json::from_str::<FabricNode>(&json).unwrap(), cell);
    }
}
