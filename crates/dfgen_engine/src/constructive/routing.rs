//! Probabilistic routing between placed operations.

use crate::routing::{shortest_path, Path};
use dfgen_fabric::{FabricGraph, FabricNode};
use rand::Rng;
use std::collections::BTreeMap;

/// Tries to connect every ordered pair of operations with probability `alpha`.
///
/// A selected pair `(i, j)` is routed along an unrestricted shortest fabric
/// path from `placement[i]` to `placement[j]`; pairs with no path are
/// dropped. Keys are operation indices.
pub(crate) fn random_routing<R: Rng + ?Sized>(
    graph: &FabricGraph,
    placement: &[FabricNode],
    alpha: f64,
    rng: &mut R,
) -> BTreeMap<(usize, usize), Path> {
    let mut routes = BTreeMap::new();
    for (i, &from) in placement.iter().enumerate() {
        for (j, &to) in placement.iter().enumerate() {
            if i == j || rng.gen::<f64>() >= alpha {
                continue;
            }
            if let Some(path) = shortest_path(graph, from, to, usize::MAX, |_| false) {
                routes.insert((i, j), path);
            }
        }
    }
    routes
}
