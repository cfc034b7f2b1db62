//! Constructive random generation (CGRA only).
//!
//! Unlike the grammar, this mode fixes the operation count up front: it
//! places `dfg_size` operations on distinct random fabric nodes, routes a
//! random subset of ordered pairs, and keeps the result only if the
//! operation graph is weakly connected.

mod placement;
mod routing;

use crate::dfg::Dfg;
use crate::error::{GenResult, GenerationError};
use crate::routing::Path;
use dfgen_fabric::{Fabric, FabricNode};
use petgraph::algo::connected_components;
use petgraph::graph::DiGraph;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Default attempt ceiling of [`ConstructiveGenerator::generate_mapping`].
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Default probability of routing each ordered operation pair.
pub const DEFAULT_ROUTING_ALPHA: f64 = 0.3;

/// A placed and routed operation graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// Location of each operation, indexed by operation id.
    pub placement: Vec<FabricNode>,
    /// Fabric path of each routed dependency, keyed by `(from_op, to_op)`.
    pub routing: BTreeMap<(usize, usize), Path>,
}

impl Mapping {
    /// Number of operations.
    pub fn op_count(&self) -> usize {
        self.placement.len()
    }

    /// Number of routed dependencies.
    pub fn edge_count(&self) -> usize {
        self.routing.len()
    }

    /// Returns whether the operation graph is weakly connected.
    ///
    /// A mapping with no operations is not.
    pub fn is_weakly_connected(&self) -> bool {
        if self.placement.is_empty() {
            return false;
        }
        let mut graph = DiGraph::<(), ()>::with_capacity(self.op_count(), self.edge_count());
        let indices: Vec<_> = (0..self.op_count()).map(|_| graph.add_node(())).collect();
        for &(from, to) in self.routing.keys() {
            graph.add_edge(indices[from], indices[to], ());
        }
        connected_components(&graph) == 1
    }

    /// Converts the mapping into a DFG over fabric nodes.
    ///
    /// Operation `i` becomes the node at `placement[i]`; each routed pair
    /// becomes one edge regardless of its path length.
    pub fn to_dfg(&self) -> Dfg {
        let mut dfg = Dfg::new();
        for &node in &self.placement {
            dfg.add_node(node);
        }
        for &(from, to) in self.routing.keys() {
            dfg.add_edge(self.placement[from], self.placement[to]);
        }
        dfg
    }
}

/// Random placement-and-routing generator for one fabric and size.
#[derive(Debug)]
pub struct ConstructiveGenerator<'a> {
    fabric: &'a dyn Fabric,
    dfg_size: usize,
    alpha: f64,
}

impl<'a> ConstructiveGenerator<'a> {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::FabricTooSmall`] if the fabric has fewer
    /// slots than `dfg_size`, and [`GenerationError::InvalidParams`] for a
    /// zero size or an `alpha` outside `[0, 1]`.
    pub fn new(fabric: &'a dyn Fabric, dfg_size: usize, alpha: f64) -> GenResult<Self> {
        if dfg_size == 0 {
            return Err(GenerationError::InvalidParams(
                "DFG size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&alpha) {
            return Err(GenerationError::InvalidParams(format!(
                "routing alpha {alpha} must be within [0, 1]"
            )));
        }
        let available = fabric.slot_count();
        if dfg_size > available {
            return Err(GenerationError::FabricTooSmall {
                requested: dfg_size,
                available,
            });
        }
        Ok(Self {
            fabric,
            dfg_size,
            alpha,
        })
    }

    /// Places, routes and validates until a connected mapping appears.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::NoValidMapping`] after `max_attempts`
    /// disconnected results.
    pub fn generate_mapping<R: Rng + ?Sized>(
        &self,
        max_attempts: usize,
        rng: &mut R,
    ) -> GenResult<Mapping> {
        let graph = self.fabric.graph();
        for attempt in 1..=max_attempts {
            let placement = placement::random_placement(graph, self.dfg_size, rng).ok_or(
                GenerationError::FabricTooSmall {
                    requested: self.dfg_size,
                    available: graph.node_count(),
                },
            )?;
            let routing = routing::random_routing(graph, &placement, self.alpha, rng);
            let mapping = Mapping { placement, routing };
            if mapping.is_weakly_connected() {
                debug!(attempt, edges = mapping.edge_count(), "valid mapping found");
                return Ok(mapping);
            }
            trace!(attempt, "mapping is disconnected, retrying");
        }
        Err(GenerationError::NoValidMapping {
            attempts: max_attempts,
        })
    }
}
