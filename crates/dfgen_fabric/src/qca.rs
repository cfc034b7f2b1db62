//! QCA fabric models for the USE, RES and 2DDWave clocking schemes.
//!
//! In a clocked QCA layout a signal may only move from one cell to an
//! adjacent cell in the next clock zone. USE and RES assign zones 1–4 with a
//! repeating 4x4 tile, so a cardinal neighbor `v` of `u` is reachable iff
//! `zone(v) == zone(u) % 4 + 1`. 2DDWave flows strictly east and south.

use crate::border::BorderSet;
use crate::error::{FabricError, FabricResult};
use crate::graph::FabricGraph;
use crate::node::FabricNode;
use crate::{Fabric, Technology};
use std::fmt;
use std::str::FromStr;

/// USE clock-zone tile, indexed `[row % 4][col % 4]`.
const USE_CLOCK_TILE: [[u8; 4]; 4] = [[1, 2, 3, 4], [4, 3, 2, 1], [3, 4, 1, 2], [2, 1, 4, 3]];

/// RES clock-zone tile, indexed `[row % 4][col % 4]`.
const RES_CLOCK_TILE: [[u8; 4]; 4] = [[4, 1, 2, 3], [1, 2, 3, 4], [2, 3, 4, 1], [3, 4, 1, 2]];

/// Clocking scheme of a QCA fabric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QcaScheme {
    /// Universal, Scalable, Efficient (`U`).
    Use,
    /// Robust, Efficient, Scalable (`R`).
    Res,
    /// Two-dimensional diagonal wave (`T`): east and south only.
    TwoDDWave,
}

impl QcaScheme {
    /// Parses a one-letter architecture token (`U`, `R` or `T`, any case).
    pub fn from_token(token: &str) -> FabricResult<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "U" => Ok(Self::Use),
            "R" => Ok(Self::Res),
            "T" => Ok(Self::TwoDDWave),
            _ => Err(FabricError::UnknownQcaScheme(token.to_string())),
        }
    }

    /// The one-letter token for this scheme.
    pub fn token(self) -> char {
        match self {
            Self::Use => 'U',
            Self::Res => 'R',
            Self::TwoDDWave => 'T',
        }
    }

    /// Clock zone (1–4) of a cell, or `None` for 2DDWave, which has no tile.
    pub fn clock_zone(self, row: u32, col: u32) -> Option<u8> {
        let tile = match self {
            Self::Use => &USE_CLOCK_TILE,
            Self::Res => &RES_CLOCK_TILE,
            Self::TwoDDWave => return None,
        };
        Some(tile[(row % 4) as usize][(col % 4) as usize])
    }
}

impl FromStr for QcaScheme {
    type Err = FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
    }
}

impl fmt::Display for QcaScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A QCA connectivity model for one grid size and clocking scheme.
#[derive(Debug, Clone)]
pub struct QcaFabric {
    rows: u32,
    cols: u32,
    scheme: QcaScheme,
    graph: FabricGraph,
    border: BorderSet,
}

impl QcaFabric {
    /// Builds the connectivity graph and border set.
    ///
    /// Every grid cell is a node, including cells with no valid transition.
    pub fn new(rows: u32, cols: u32, scheme: QcaScheme) -> FabricResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(FabricError::InvalidDimensions { rows, cols });
        }

        let mut graph = FabricGraph::new();
        for r in 0..rows {
            for c in 0..cols {
                graph.add_node(FabricNode::qca(r, c));
            }
        }
        for r in 0..rows {
            for c in 0..cols {
                let node = FabricNode::qca(r, c);
                for next in transitions(scheme, rows, cols, r, c) {
                    graph.add_edge(node, next);
                }
            }
        }

        Ok(Self {
            rows,
            cols,
            scheme,
            graph,
            border: BorderSet::perimeter(rows, cols, None),
        })
    }

    /// Returns the clocking scheme.
    pub fn scheme(&self) -> QcaScheme {
        self.scheme
    }
}

/// Valid one-step transitions out of cell `(r, c)`.
fn transitions(scheme: QcaScheme, rows: u32, cols: u32, r: u32, c: u32) -> Vec<FabricNode> {
    let in_bounds = |(nr, nc): (i64, i64)| {
        (0..i64::from(rows)).contains(&nr) && (0..i64::from(cols)).contains(&nc)
    };
    let (r64, c64) = (i64::from(r), i64::from(c));

    match scheme.clock_zone(r, c) {
        None => [(r64, c64 + 1), (r64 + 1, c64)]
            .into_iter()
            .filter(|&p| in_bounds(p))
            .map(|(nr, nc)| FabricNode::qca(nr as u32, nc as u32))
            .collect(),
        Some(zone) => {
            let next_zone = zone % 4 + 1;
            [(r64 - 1, c64), (r64 + 1, c64), (r64, c64 - 1), (r64, c64 + 1)]
                .into_iter()
                .filter(|&p| in_bounds(p))
                .map(|(nr, nc)| (nr as u32, nc as u32))
                .filter(|&(nr, nc)| scheme.clock_zone(nr, nc) == Some(next_zone))
                .map(|(nr, nc)| FabricNode::qca(nr, nc))
                .collect()
        }
    }
}

impl Fabric for QcaFabric {
    fn technology(&self) -> Technology {
        Technology::Qca
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }

    fn graph(&self) -> &FabricGraph {
        &self.graph
    }

    fn border_nodes(&self) -> &BorderSet {
        &self.border
    }

    fn label(&self) -> String {
        format!("qca {}x{} {}", self.rows, self.cols, self.scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn succ(fabric: &QcaFabric, r: u32, c: u32) -> BTreeSet<FabricNode> {
        fabric.graph().successors(FabricNode::qca(r, c)).collect()
    }

    #[test]
    fn parse_tokens() {
        assert_eq!(QcaScheme::from_token("U").unwrap(), QcaScheme::Use);
        assert_eq!(QcaScheme::from_token("r").unwrap(), QcaScheme::Res);
        assert_eq!("T".parse::<QcaScheme>().unwrap(), QcaScheme::TwoDDWave);
    }

    #[test]
    fn unknown_token_is_fatal() {
        assert_eq!(
            QcaScheme::from_token("X").unwrap_err(),
            FabricError::UnknownQcaScheme("X".to_string())
        );
    }

    #[test]
    fn two_dd_wave_flows_east_and_south() {
        let fabric = QcaFabric::new(4, 4, QcaScheme::TwoDDWave).unwrap();
        let expected: BTreeSet<_> = [FabricNode::qca(0, 1), FabricNode::qca(1, 0)]
            .into_iter()
            .collect();
        assert_eq!(succ(&fabric, 0, 0), expected);
        assert!(succ(&fabric, 3, 3).is_empty());
        assert_eq!(succ(&fabric, 3, 0).len(), 1);
        assert!(fabric.graph().contains_node(FabricNode::qca(3, 3)));
    }

    #[test]
    fn use_transitions_follow_clock_zones() {
        let fabric = QcaFabric::new(4, 4, QcaScheme::Use).unwrap();
        // (0,0) is zone 1; its only zone-2 cardinal neighbor is (0,1).
        assert_eq!(
            succ(&fabric, 0, 0),
            [FabricNode::qca(0, 1)].into_iter().collect()
        );
        for (u, v) in fabric.graph().edges() {
            let zu = QcaScheme::Use.clock_zone(u.row(), u.col()).unwrap();
            let zv = QcaScheme::Use.clock_zone(v.row(), v.col()).unwrap();
            assert_eq!(zv, zu % 4 + 1);
            assert_eq!(u.manhattan(v), 1);
        }
    }

    #[test]
    fn res_transitions_follow_clock_zones() {
        let fabric = QcaFabric::new(6, 6, QcaScheme::Res).unwrap();
        assert!(fabric.graph().edge_count() > 0);
        for (u, v) in fabric.graph().edges() {
            let zu = QcaScheme::Res.clock_zone(u.row(), u.col()).unwrap();
            let zv = QcaScheme::Res.clock_zone(v.row(), v.col()).unwrap();
            assert_eq!(zv, zu % 4 + 1);
        }
        // (1,0) is zone 1 and reaches zone-2 cells (2,0) and (1,1).
        assert_eq!(
            succ(&fabric, 1, 0),
            [FabricNode::qca(1, 1), FabricNode::qca(2, 0)]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn tile_repeats_every_four_cells() {
        for scheme in [QcaScheme::Use, QcaScheme::Res] {
            assert_eq!(scheme.clock_zone(1, 2), scheme.clock_zone(5, 6));
            assert_eq!(scheme.clock_zone(0, 3), scheme.clock_zone(8, 7));
        }
        assert_eq!(QcaScheme::TwoDDWave.clock_zone(0, 0), None);
    }

    #[test]
    fn border_is_perimeter() {
        let fabric = QcaFabric::new(4, 4, QcaScheme::Use).unwrap();
        assert_eq!(fabric.border_nodes().len(), 12);
        assert_eq!(
            fabric.border_nodes(),
            &BorderSet::perimeter(4, 4, None)
        );
    }

    #[test]
    fn label_includes_scheme() {
        let fabric = QcaFabric::new(3, 5, QcaScheme::Res).unwrap();
        assert_eq!(fabric.label(), "qca 3x5 R");
        assert_eq!(fabric.scheme(), QcaScheme::Res);
    }
}
