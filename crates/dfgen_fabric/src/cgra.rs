//! CGRA fabric model.
//!
//! A CGRA is a `rows x cols` grid of processing elements (PEs) that are
//! time-multiplexed over an initiation interval (II). Every PE contributes one
//! [`FabricNode::Slot`] per time slot. Spatial connections (mesh, diagonal,
//! one-hop, toroidal) stay inside their time slot; the only edge that advances
//! time is the temporal edge from `(r, c, t)` to `(r, c, (t + 1) mod II)`,
//! present when `II > 1`.
//!
//! Which spatial connections exist is selected by a 4-character `"mdht"` bit
//! string (see [`Interconnect`]).

use crate::border::BorderSet;
use crate::error::{FabricError, FabricResult};
use crate::graph::FabricGraph;
use crate::node::FabricNode;
use crate::{Fabric, Technology};
use std::fmt;
use std::str::FromStr;

/// Offsets of the four axis-aligned neighbors.
const MESH_OFFSETS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Offsets of the four diagonal neighbors.
const DIAGONAL_OFFSETS: [(i64, i64); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Offsets of the four neighbors two steps away along an axis.
const ONE_HOP_OFFSETS: [(i64, i64); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];

/// Spatial interconnect features of a CGRA, parsed from an `"mdht"` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Interconnect {
    /// `m`: four axis-aligned neighbors.
    pub mesh: bool,
    /// `d`: four diagonal neighbors.
    pub diagonal: bool,
    /// `h`: four neighbors at distance two along an axis.
    pub one_hop: bool,
    /// `t`: wrap-around links between opposite grid edges.
    pub toroidal: bool,
}

impl Interconnect {
    /// Plain mesh interconnect (`"1000"`).
    pub const MESH: Self = Self {
        mesh: true,
        diagonal: false,
        one_hop: false,
        toroidal: false,
    };

    /// Parses a 4-character `"mdht"` bit string such as `"1000"` or `"1111"`.
    pub fn from_bits(bits: &str) -> FabricResult<Self> {
        let flags: Vec<bool> = bits
            .chars()
            .map(|ch| match ch {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(FabricError::InvalidInterconnect(bits.to_string())),
            })
            .collect::<FabricResult<_>>()?;
        match flags.as_slice() {
            &[mesh, diagonal, one_hop, toroidal] => Ok(Self {
                mesh,
                diagonal,
                one_hop,
                toroidal,
            }),
            _ => Err(FabricError::InvalidInterconnect(bits.to_string())),
        }
    }

    /// Returns the `"mdht"` bit string.
    pub fn bits(&self) -> String {
        [self.mesh, self.diagonal, self.one_hop, self.toroidal]
            .iter()
            .map(|&b| if b { '1' } else { '0' })
            .collect()
    }

    /// Human-readable name used in output paths.
    ///
    /// Enabled features joined with `-`; `"all"` when every feature is on and
    /// `"custom"` when none is.
    pub fn name(&self) -> String {
        let features = [
            (self.mesh, "mesh"),
            (self.diagonal, "diagonal"),
            (self.one_hop, "one_hop"),
            (self.toroidal, "toroidal"),
        ];
        let enabled: Vec<&str> = features
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        match enabled.len() {
            0 => "custom".to_string(),
            4 => "all".to_string(),
            _ => enabled.join("-"),
        }
    }
}

impl FromStr for Interconnect {
    type Err = FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bits(s)
    }
}

impl fmt::Display for Interconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bits())
    }
}

/// A CGRA connectivity model for one grid size, interconnect and II.
#[derive(Debug, Clone)]
pub struct CgraFabric {
    rows: u32,
    cols: u32,
    ii: u32,
    interconnect: Interconnect,
    graph: FabricGraph,
    border: BorderSet,
}

impl CgraFabric {
    /// Builds the connectivity graph and border set.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::InvalidDimensions`] for an empty grid and
    /// [`FabricError::ZeroInitiationInterval`] for `ii == 0`.
    pub fn new(rows: u32, cols: u32, interconnect: Interconnect, ii: u32) -> FabricResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(FabricError::InvalidDimensions { rows, cols });
        }
        if ii == 0 {
            return Err(FabricError::ZeroInitiationInterval);
        }

        let mut fabric = Self {
            rows,
            cols,
            ii,
            interconnect,
            graph: FabricGraph::new(),
            border: BorderSet::perimeter(rows, cols, Some(ii)),
        };

        for t in 0..ii {
            for r in 0..rows {
                for c in 0..cols {
                    fabric.graph.add_node(FabricNode::cgra(r, c, t));
                }
            }
        }
        for t in 0..ii {
            for r in 0..rows {
                for c in 0..cols {
                    let node = FabricNode::cgra(r, c, t);
                    fabric.add_temporal_edge(node);
                    fabric.add_spatial_edges(node);
                    fabric.add_toroidal_edges(node);
                }
            }
        }
        Ok(fabric)
    }

    /// Returns the initiation interval.
    pub fn initiation_interval(&self) -> u32 {
        self.ii
    }

    /// Returns the interconnect configuration.
    pub fn interconnect(&self) -> Interconnect {
        self.interconnect
    }

    fn add_temporal_edge(&mut self, node: FabricNode) {
        if self.ii > 1 {
            let (r, c, t) = (node.row(), node.col(), node.time().unwrap_or(0));
            self.graph
                .add_edge(node, FabricNode::cgra(r, c, (t + 1) % self.ii));
        }
    }

    fn add_spatial_edges(&mut self, node: FabricNode) {
        let mut offsets: Vec<(i64, i64)> = Vec::with_capacity(12);
        if self.interconnect.mesh {
            offsets.extend(MESH_OFFSETS);
        }
        if self.interconnect.diagonal {
            offsets.extend(DIAGONAL_OFFSETS);
        }
        if self.interconnect.one_hop {
            offsets.extend(ONE_HOP_OFFSETS);
        }

        let t = node.time().unwrap_or(0);
        for (dr, dc) in offsets {
            let nr = i64::from(node.row()) + dr;
            let nc = i64::from(node.col()) + dc;
            if (0..i64::from(self.rows)).contains(&nr) && (0..i64::from(self.cols)).contains(&nc) {
                self.graph
                    .add_edge(node, FabricNode::cgra(nr as u32, nc as u32, t));
            }
        }
    }

    fn add_toroidal_edges(&mut self, node: FabricNode) {
        if !self.interconnect.toroidal {
            return;
        }
        let (r, c, t) = (node.row(), node.col(), node.time().unwrap_or(0));
        let wrapped = [
            ((r + 1) % self.rows, c),
            ((r + self.rows - 1) % self.rows, c),
            (r, (c + 1) % self.cols),
            (r, (c + self.cols - 1) % self.cols),
        ];
        for (nr, nc) in wrapped {
            let target = FabricNode::cgra(nr, nc, t);
            // A 1-wide axis wraps onto the node itself.
            if target != node && !self.graph.has_edge(node, target) {
                self.graph.add_edge(node, target);
            }
        }
    }
}

impl Fabric for CgraFabric {
    fn technology(&self) -> Technology {
        Technology::Cgra
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
        format!(
            "cgra {}x{} {} II={}",
            self.rows,
            self.cols,
            self.interconnect.name(),
            self.ii
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn out_neighbors(fabric: &CgraFabric, node: FabricNode) -> BTreeSet<FabricNode> {
        fabric.graph().successors(node).collect()
    }

    #[test]
    fn parse_bits() {
        assert_eq!(Interconnect::from_bits("1000").unwrap(), Interconnect::MESH);
        let all: Interconnect = "1111".parse().unwrap();
        assert!(all.mesh && all.diagonal && all.one_hop && all.toroidal);
        assert_eq!(all.bits(), "1111");
    }

    #[test]
    fn reject_malformed_bits() {
        assert!(matches!(
            Interconnect::from_bits("100"),
            Err(FabricError::InvalidInterconnect(_))
        ));
        assert!(matches!(
            Interconnect::from_bits("10a0"),
            Err(FabricError::InvalidInterconnect(_))
        ));
        assert!(Interconnect::from_bits("10000").is_err());
    }

    #[test]
    fn interconnect_names() {
        assert_eq!(Interconnect::MESH.name(), "mesh");
        assert_eq!(Interconnect::from_bits("1111").unwrap().name(), "all");
        assert_eq!(Interconnect::from_bits("0000").unwrap().name(), "custom");
        assert_eq!(
            Interconnect::from_bits("1010").unwrap().name(),
            "mesh-one_hop"
        );
        assert_eq!(
            Interconnect::from_bits("0101").unwrap().name(),
            "diagonal-toroidal"
        );
    }

    #[test]
    fn mesh_interior_node_has_four_neighbors() {
        let fabric = CgraFabric::new(4, 4, Interconnect::MESH, 1).unwrap();
        let expected: BTreeSet<_> = [
            FabricNode::cgra(0, 1, 0),
            FabricNode::cgra(2, 1, 0),
            FabricNode::cgra(1, 0, 0),
            FabricNode::cgra(1, 2, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(out_neighbors(&fabric, FabricNode::cgra(1, 1, 0)), expected);
    }

    #[test]
    fn mesh_corner_node_has_two_neighbors() {
        let fabric = CgraFabric::new(4, 4, Interconnect::MESH, 1).unwrap();
        assert_eq!(fabric.graph().out_degree(FabricNode::cgra(0, 0, 0)), 2);
    }

    #[test]
    fn node_count_scales_with_ii() {
        let fabric = CgraFabric::new(3, 4, Interconnect::MESH, 3).unwrap();
        assert_eq!(fabric.graph().node_count(), 36);
    }

    #[test]
    fn temporal_edge_advances_time_only() {
        let fabric = CgraFabric::new(4, 4, Interconnect::MESH, 2).unwrap();
        let n = FabricNode::cgra(1, 1, 0);
        let succ = out_neighbors(&fabric, n);
        assert!(succ.contains(&FabricNode::cgra(1, 1, 1)));
        // Spatial edges stay within the time slot.
        assert!(succ.contains(&FabricNode::cgra(0, 1, 0)));
        assert!(!succ.contains(&FabricNode::cgra(0, 1, 1)));
        assert_eq!(succ.len(), 5);
        // Wraps back to slot 0.
        assert!(fabric
            .graph()
            .has_edge(FabricNode::cgra(1, 1, 1), FabricNode::cgra(1, 1, 0)));
    }

    #[test]
    fn no_temporal_edge_with_ii_one() {
        let fabric = CgraFabric::new(2, 2, Interconnect::MESH, 1).unwrap();
        for node in fabric.graph().nodes() {
            for succ in fabric.graph().successors(node) {
                assert_eq!(succ.time(), Some(0));
                assert_ne!(succ, node);
            }
        }
    }

    #[test]
    fn diagonal_and_one_hop() {
        let fabric = CgraFabric::new(5, 5, Interconnect::from_bits("0110").unwrap(), 1).unwrap();
        let succ = out_neighbors(&fabric, FabricNode::cgra(2, 2, 0));
        assert_eq!(succ.len(), 8);
        assert!(succ.contains(&FabricNode::cgra(1, 1, 0)));
        assert!(succ.contains(&FabricNode::cgra(4, 2, 0)));
        assert!(succ.contains(&FabricNode::cgra(2, 0, 0)));
        assert!(!succ.contains(&FabricNode::cgra(2, 3, 0)));
    }

    #[test]
    fn toroidal_wraps_edges() {
        let fabric = CgraFabric::new(4, 4, Interconnect::from_bits("1001").unwrap(), 1).unwrap();
        let succ = out_neighbors(&fabric, FabricNode::cgra(0, 0, 0));
        assert!(succ.contains(&FabricNode::cgra(3, 0, 0)));
        assert!(succ.contains(&FabricNode::cgra(0, 3, 0)));
        assert_eq!(succ.len(), 4);
    }

    #[test]
    fn toroidal_alone_connects_neighbors() {
        let fabric = CgraFabric::new(3, 3, Interconnect::from_bits("0001").unwrap(), 1).unwrap();
        // Without mesh, wrap links still reach the axis neighbors.
        assert_eq!(fabric.graph().out_degree(FabricNode::cgra(1, 1, 0)), 4);
    }

    #[test]
    fn toroidal_skips_self_loops() {
        let fabric = CgraFabric::new(1, 3, Interconnect::from_bits("0001").unwrap(), 1).unwrap();
        let n = FabricNode::cgra(0, 1, 0);
        assert!(!fabric.graph().has_edge(n, n));
        assert_eq!(fabric.graph().out_degree(n), 2);
    }

    #[test]
    fn border_covers_all_slots() {
        let fabric = CgraFabric::new(4, 4, Interconnect::MESH, 2).unwrap();
        assert_eq!(fabric.border_nodes().len(), 24);
        assert!(fabric.border_nodes().contains(FabricNode::cgra(0, 2, 1)));
        assert!(!fabric.border_nodes().contains(FabricNode::cgra(1, 2, 1)));
    }

    #[test]
    fn invalid_dimensions_and_ii() {
        assert_eq!(
            CgraFabric::new(0, 4, Interconnect::MESH, 1).unwrap_err(),
            FabricError::InvalidDimensions { rows: 0, cols: 4 }
        );
        assert_eq!(
            CgraFabric::new(4, 4, Interconnect::MESH, 0).unwrap_err(),
            FabricError::ZeroInitiationInterval
        );
    }

    #[test]
    fn label_and_dimensions() {
        let fabric = CgraFabric::new(4, 8, Interconnect::MESH, 2).unwrap();
        assert_eq!(fabric.dimensions(), (4, 8));
        assert_eq!(fabric.technology(), Technology::Cgra);
        assert_eq!(fabric.label(), "cgra 4x8 mesh II=2");
    }
}
