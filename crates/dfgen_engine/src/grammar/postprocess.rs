//! Post-processing applied to accepted QCA growth results.
//!
//! [`merge`] adds extra fabric edges between already-used nodes, and
//! [`extend_io_to_border`] routes every source and sink of the DFG out to
//! the fabric perimeter so that primary I/O sits on the border.

use crate::routing::shortest_path;
use crate::state::GrowthState;
use dfgen_fabric::{BorderSet, FabricGraph, FabricNode};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

/// Default probability of adding each eligible merge edge.
pub const DEFAULT_MERGE_ALPHA: f64 = 0.15;

/// Adds fabric edges between used nodes with probability `alpha`.
///
/// Edges are visited in random order. An edge is skipped if it is already in
/// the DFG or would close a cycle. Returns the number of edges added.
pub fn merge<R: Rng + ?Sized>(
    graph: &FabricGraph,
    state: &mut GrowthState,
    alpha: f64,
    rng: &mut R,
) -> usize {
    let mut edges: Vec<(FabricNode, FabricNode)> = graph.edges().collect();
    edges.shuffle(rng);

    let mut added = 0;
    for (from, to) in edges {
        if from == to || !state.is_used(from) || !state.is_used(to) {
            continue;
        }
        if state.dfg().has_edge(from, to) || state.dfg().has_path(to, from) {
            continue;
        }
        if rng.gen::<f64>() < alpha && state.add_edge(from, to) {
            added += 1;
        }
    }
    debug!(added, alpha, "merge pass complete");
    added
}

/// Connects every DFG source and sink to its nearest border node.
///
/// Sources (in-degree 0 with successors) are fed from the border; sinks and
/// isolated nodes drain to the border. Nodes already on the border are left
/// alone. An extension is skipped when no path fits within `max_path_length`
/// or when it would close a cycle through an already-used border node.
/// Returns the number of extensions committed.
pub fn extend_io_to_border(
    graph: &FabricGraph,
    border: &BorderSet,
    state: &mut GrowthState,
    max_path_length: usize,
) -> usize {
    if state.dfg().topological_order().is_none() {
        warn!("DFG contains a cycle, skipping I/O extension");
        return 0;
    }

    let dfg = state.dfg();
    let io_nodes: Vec<FabricNode> = dfg
        .nodes()
        .filter(|&n| dfg.in_degree(n) == 0 || dfg.out_degree(n) == 0)
        .filter(|&n| !border.contains(n))
        .collect();

    let mut extended = 0;
    for node in io_nodes {
        let Some(anchor) = border.nearest(node) else {
            continue;
        };
        let dfg = state.dfg();
        let is_source = dfg.in_degree(node) == 0 && dfg.out_degree(node) > 0;
        let (from, to) = if is_source {
            (anchor, node)
        } else {
            (node, anchor)
        };

        let Some(path) = shortest_path(graph, from, to, max_path_length, |n| state.is_used(n))
        else {
            debug!(%node, %anchor, "no border path within bound");
            continue;
        };
        if state.is_used(anchor) && state.dfg().has_path(to, from) {
            debug!(%node, %anchor, "border extension would close a cycle");
            continue;
        }
        state.commit_paths(&[path]);
        extended += 1;
    }
    extended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::RuleKind;
    use dfgen_fabric::{Fabric, QcaFabric, QcaScheme};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn n(r: u32, c: u32) -> FabricNode {
        FabricNode::qca(r, c)
    }

    fn wave(rows: u32, cols: u32) -> QcaFabric {
        QcaFabric::new(rows, cols, QcaScheme::TwoDDWave).unwrap()
    }

    #[test]
    fn merge_with_alpha_one_adds_all_acyclic_edges() {
        let fabric = wave(3, 3);
        let mut state = GrowthState::seeded(n(0, 0));
        state.commit(RuleKind::Tree, &[vec![n(0, 0), n(0, 1), n(1, 1)]]);
        state.commit(RuleKind::Tree, &[vec![n(0, 0), n(1, 0)]]);
        let mut rng = StdRng::seed_from_u64(0);

        let added = merge(fabric.graph(), &mut state, 1.0, &mut rng);
        assert_eq!(added, 1);
        assert!(state.dfg().has_edge(n(1, 0), n(1, 1)));
        assert!(state.dfg().topological_order().is_some());
    }

    #[test]
    fn merge_with_alpha_zero_adds_nothing() {
        let fabric = wave(3, 3);
        let mut state = GrowthState::seeded(n(0, 0));
        state.commit(RuleKind::Tree, &[vec![n(0, 0), n(0, 1), n(1, 1)]]);
        state.commit(RuleKind::Tree, &[vec![n(0, 0), n(1, 0)]]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(merge(fabric.graph(), &mut state, 0.0, &mut rng), 0);
        assert_eq!(state.dfg().edge_count(), 3);
    }

    #[test]
    fn merge_never_creates_cycles() {
        let fabric = QcaFabric::new(4, 4, QcaScheme::Use).unwrap();
        let mut state = GrowthState::new();
        for (a, b) in fabric.graph().edges().take(10) {
            state.commit_paths(&[vec![a, b]]);
            if state.dfg().topological_order().is_none() {
                state = GrowthState::new();
            }
        }
        let mut rng = StdRng::seed_from_u64(4);
        merge(fabric.graph(), &mut state, 1.0, &mut rng);
        assert!(state.dfg().topological_order().is_some());
    }

    #[test]
    fn interior_sink_is_drained_to_border() {
        let fabric = wave(5, 5);
        let mut state = GrowthState::seeded(n(0, 2));
        state.commit(RuleKind::Tree, &[vec![n(0, 2), n(1, 2), n(2, 2), n(3, 2)]]);

        let extended = extend_io_to_border(fabric.graph(), fabric.border_nodes(), &mut state, 10);
        assert_eq!(extended, 1);
        let sinks: Vec<FabricNode> = state
            .dfg()
            .nodes()
            .filter(|&v| state.dfg().out_degree(v) == 0)
            .collect();
        assert_eq!(sinks, vec![n(4, 2)]);
    }

    #[test]
    fn interior_source_is_fed_from_border() {
        let fabric = wave(5, 5);
        let mut state = GrowthState::seeded(n(2, 2));
        state.commit(RuleKind::Tree, &[vec![n(2, 2), n(2, 3), n(2, 4)]]);

        extend_io_to_border(fabric.graph(), fabric.border_nodes(), &mut state, 10);
        let sources: Vec<FabricNode> = state
            .dfg()
            .nodes()
            .filter(|&v| state.dfg().in_degree(v) == 0)
            .collect();
        assert_eq!(sources, vec![n(0, 2)]);
        assert!(state.dfg().has_path(n(0, 2), n(2, 2)));
    }

    #[test]
    fn border_nodes_are_left_alone() {
        let fabric = wave(4, 4);
        let mut state = GrowthState::seeded(n(0, 0));
        state.commit(RuleKind::Tree, &[vec![n(0, 0), n(0, 1)]]);
        let before = state.dfg().node_count();
        assert_eq!(
            extend_io_to_border(fabric.graph(), fabric.border_nodes(), &mut state, 10),
            0
        );
        assert_eq!(state.dfg().node_count(), before);
    }
}
