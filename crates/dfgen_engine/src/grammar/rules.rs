//! The three growth rules.
//!
//! Each rule inspects a [`GrowthState`] and proposes a batch of paths
//! without touching the state. The caller commits a successful batch, so a
//! rule can be exercised in isolation against any state.

use crate::params::{GrammarParams, KRange};
use crate::routing::{Path, SearchTree, ShortestPathDag};
use crate::state::GrowthState;
use dfgen_fabric::{FabricGraph, FabricNode};
use petgraph::Direction;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fmt;

/// Number of start nodes the tree rule tries before giving up.
pub const MAX_TREE_START_ATTEMPTS: usize = 5;

/// A growth rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Fan-out from an existing node. Increments no counter.
    Tree,
    /// Fan-in from fresh sources into an existing node.
    Convergence,
    /// Parallel equal-length paths that split and rejoin.
    Reconvergence,
}

impl RuleKind {
    /// Lowercase rule name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Convergence => "convergence",
            Self::Reconvergence => "reconvergence",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only inputs shared by all rules during one attempt.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Fabric connectivity.
    pub graph: &'a FabricGraph,
    /// Branching-factor range.
    pub k_range: KRange,
    /// Longest allowed path, in edges.
    pub max_path_length: usize,
}

impl<'a> RuleContext<'a> {
    /// Builds a context from grammar parameters.
    pub fn new(graph: &'a FabricGraph, params: &GrammarParams) -> Self {
        Self {
            graph,
            k_range: params.k_range,
            max_path_length: params.max_path_length,
        }
    }

    fn unused_nodes_shuffled<R: Rng + ?Sized>(
        &self,
        state: &GrowthState,
        rng: &mut R,
    ) -> Vec<FabricNode> {
        let mut nodes: Vec<FabricNode> =
            self.graph.nodes().filter(|&n| !state.is_used(n)).collect();
        nodes.shuffle(rng);
        nodes
    }
}

/// Asks rule `kind` for a batch of paths that adds at most `budget` nodes.
///
/// Returns `None` when the rule cannot apply. The state is not modified.
pub fn propose<R: Rng + ?Sized>(
    kind: RuleKind,
    ctx: &RuleContext<'_>,
    state: &GrowthState,
    budget: usize,
    rng: &mut R,
) -> Option<Vec<Path>> {
    if state.used_count() == 0 || budget == 0 {
        return None;
    }
    match kind {
        RuleKind::Tree => tree(ctx, state, budget, rng),
        RuleKind::Convergence => convergence(ctx, state, budget, rng),
        RuleKind::Reconvergence => reconvergence(ctx, state, budget, rng),
    }
}

fn random_used_node<R: Rng + ?Sized>(state: &GrowthState, rng: &mut R) -> Option<FabricNode> {
    let used: Vec<FabricNode> = state.used_nodes().collect();
    used.choose(rng).copied()
}

fn tree<R: Rng + ?Sized>(
    ctx: &RuleContext<'_>,
    state: &GrowthState,
    budget: usize,
    rng: &mut R,
) -> Option<Vec<Path>> {
    let mut starts: Vec<FabricNode> = state.used_nodes().collect();
    starts.shuffle(rng);

    let k_max = (ctx.k_range.max as usize).min(budget);
    if k_max == 0 {
        return None;
    }
    for &start in starts.iter().take(MAX_TREE_START_ATTEMPTS) {
        let k = rng.gen_range(1..=k_max);
        let targets = ctx.unused_nodes_shuffled(state, rng);
        let paths = collect_fan_paths(ctx, state, start, Direction::Outgoing, &targets, k, budget);
        if !paths.is_empty() {
            return Some(paths);
        }
    }
    None
}

fn convergence<R: Rng + ?Sized>(
    ctx: &RuleContext<'_>,
    state: &GrowthState,
    budget: usize,
    rng: &mut R,
) -> Option<Vec<Path>> {
    let k_min = ctx.k_range.min as usize;
    let k_max = (ctx.k_range.max as usize).min(budget);
    if budget < k_min || k_max < k_min {
        return None;
    }
    let sink = random_used_node(state, rng)?;
    let k = rng.gen_range(k_min..=k_max);
    let sources = ctx.unused_nodes_shuffled(state, rng);
    let paths = collect_fan_paths(ctx, state, sink, Direction::Incoming, &sources, k, budget);
    (paths.len() >= k_min).then_some(paths)
}

fn reconvergence<R: Rng + ?Sized>(
    ctx: &RuleContext<'_>,
    state: &GrowthState,
    budget: usize,
    rng: &mut R,
) -> Option<Vec<Path>> {
    let k_min = ctx.k_range.min as usize;
    if budget < k_min + 1 {
        return None;
    }
    let k_max = (ctx.k_range.max as usize).min(budget - 1);
    if k_max < k_min {
        return None;
    }
    let k = rng.gen_range(k_min..=k_max);
    let start = random_used_node(state, rng)?;

    // Every candidate endpoint is unused, so one DAG serves them all.
    let dag = ShortestPathDag::build(ctx.graph, start, ctx.max_path_length, |n| {
        state.is_used(n)
    });
    for end in ctx.unused_nodes_shuffled(state, rng) {
        if dag.distance(end).is_none() {
            continue;
        }
        let used = |n| state.is_used(n);
        if let Some(paths) = dag.disjoint_paths(end, k, budget, used, &mut *rng) {
            return Some(paths);
        }
    }
    None
}

/// Collects up to `k` shortest paths between `anchor` and the candidates.
///
/// With [`Direction::Outgoing`] paths run from the anchor to a candidate,
/// with [`Direction::Incoming`] from a candidate to the anchor. Nodes claimed
/// by earlier paths of the same call are excluded from later searches and
/// the total of new nodes never exceeds `budget`.
fn collect_fan_paths(
    ctx: &RuleContext<'_>,
    state: &GrowthState,
    anchor: FabricNode,
    direction: Direction,
    candidates: &[FabricNode],
    k: usize,
    budget: usize,
) -> Vec<Path> {
    let mut paths = Vec::new();
    let mut claimed: HashSet<FabricNode> = HashSet::new();
    let mut tree: Option<SearchTree> = None;

    for &candidate in candidates {
        if paths.len() >= k {
            break;
        }
        if claimed.contains(&candidate) {
            continue;
        }
        let search = tree.get_or_insert_with(|| {
            SearchTree::build(ctx.graph, anchor, direction, ctx.max_path_length, |n| {
                state.is_used(n) || claimed.contains(&n)
            })
        });
        let Some(path) = search.path_to(candidate) else {
            continue;
        };
        let fresh: Vec<FabricNode> = path
            .iter()
            .copied()
            .filter(|&n| !state.is_used(n) && !claimed.contains(&n))
            .collect();
        if claimed.len() + fresh.len() > budget {
            continue;
        }
        claimed.extend(fresh);
        paths.push(path);
        // The claimed set changed; later searches must route around it.
        tree = None;
    }
    paths
}
