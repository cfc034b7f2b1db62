//! Physical fabric models for the dfgen DFG generator.
//!
//! This crate provides the [`Fabric`] trait that abstracts over spatial
//! hardware fabrics, and two concrete models: [`CgraFabric`] (a
//! time-multiplexed grid of processing elements) and [`QcaFabric`] (a clocked
//! cellular array). Each fabric exposes a directed [`FabricGraph`] of one-hop
//! physical connections and the [`BorderSet`] of perimeter nodes used as I/O
//! anchors.
//!
//! # Usage
//!
//! Use [`load_fabric`] to build a fabric from a [`FabricSpec`]:
//!
//! ```
//! use dfgen_fabric::{load_fabric, FabricSpec, Interconnect};
//!
//! let spec = FabricSpec::Cgra { rows: 4, cols: 4, interconnect: Interconnect::MESH, ii: 1 };
//! let fabric = load_fabric(&spec).unwrap();
//! assert_eq!(fabric.graph().node_count(), 16);
//! ```

#![warn(missing_docs)]

pub mod border;
pub mod cgra;
pub mod error;
pub mod graph;
pub mod node;
pub mod qca;

pub use border::BorderSet;
pub use cgra::{CgraFabric, Interconnect};
pub use error::{FabricError, FabricResult};
pub use graph::FabricGraph;
pub use node::FabricNode;
pub use qca::{QcaFabric, QcaScheme};

use std::fmt;

/// The hardware technology a fabric models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Technology {
    /// Coarse-grained reconfigurable array.
    Cgra,
    /// Quantum-dot cellular automata array.
    Qca,
}

impl Technology {
    /// Lowercase name used in output paths (`"cgra"`, `"qca"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cgra => "cgra",
            Self::Qca => "qca",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spatial fabric onto which DFGs are grown.
///
/// Implementations build their graph and border set once at construction;
/// every accessor is read-only, so a fabric can be shared freely between
/// generation attempts.
pub trait Fabric: fmt::Debug + Send + Sync {
    /// Returns the modelled technology.
    fn technology(&self) -> Technology;

    /// Returns the grid dimensions as `(rows, cols)`.
    fn dimensions(&self) -> (u32, u32);

    /// Returns the directed connectivity graph.
    fn graph(&self) -> &FabricGraph;

    /// Returns the perimeter nodes.
    fn border_nodes(&self) -> &BorderSet;

    /// Returns a short human-readable description for logs.
    fn label(&self) -> String;

    /// Returns the number of placement slots.
    fn slot_count(&self) -> usize {
        self.graph().node_count()
    }
}

/// A buildable fabric description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FabricSpec {
    /// A CGRA grid.
    Cgra {
        /// Grid rows.
        rows: u32,
        /// Grid columns.
        cols: u32,
        /// Spatial interconnect features.
        interconnect: Interconnect,
        /// Initiation interval.
        ii: u32,
    },
    /// A QCA grid.
    Qca {
        /// Grid rows.
        rows: u32,
        /// Grid columns.
        cols: u32,
        /// Clocking scheme.
        scheme: QcaScheme,
    },
}

/// Builds the fabric described by `spec`.
///
/// # Errors
///
/// Returns a [`FabricError`] for empty grids or a zero initiation interval.
pub fn load_fabric(spec: &FabricSpec) -> FabricResult<Box<dyn Fabric>> {
    match *spec {
        FabricSpec::Cgra {
            rows,
            cols,
            interconnect,
            ii,
        } => Ok(Box::new(CgraFabric::new(rows, cols, interconnect, ii)?)),
        FabricSpec::Qca { rows, cols, scheme } => {
            Ok(Box::new(QcaFabric::new(rows, cols, scheme)?))
        }
    }
}
