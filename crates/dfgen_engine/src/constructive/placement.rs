//! Random placement of operations onto distinct fabric nodes.

use dfgen_fabric::{FabricGraph, FabricNode};
use rand::seq::SliceRandom;
use rand::Rng;

/// Picks `count` distinct fabric nodes uniformly at random.
///
/// Entry `i` is the location of operation `i`. Returns `None` if the fabric
/// has fewer than `count` nodes.
pub(crate) fn random_placement<R: Rng + ?Sized>(
    graph: &FabricGraph,
    count: usize,
    rng: &mut R,
) -> Option<Vec<FabricNode>> {
    let mut slots: Vec<FabricNode> = graph.nodes().collect();
    if slots.len() < count {
        return None;
    }
    let (chosen, _) = slots.partial_shuffle(rng, count);
    Some(chosen.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfgen_fabric::{CgraFabric, Fabric, Interconnect};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn placements_are_distinct() {
        let fabric = CgraFabric::new(3, 3, Interconnect::MESH, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let placement = random_placement(fabric.graph(), 10, &mut rng).unwrap();
            assert_eq!(placement.len(), 10);
            let unique: HashSet<_> = placement.iter().collect();
            assert_eq!(unique.len(), 10);
            assert!(placement.iter().all(|&n| fabric.graph().contains_node(n)));
        }
    }

    #[test]
    fn full_fabric_placement() {
        let fabric = CgraFabric::new(2, 2, Interconnect::MESH, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let placement = random_placement(fabric.graph(), 4, &mut rng).unwrap();
        assert_eq!(placement.len(), 4);
        assert!(random_placement(fabric.graph(), 5, &mut rng).is_none());
    }
}
