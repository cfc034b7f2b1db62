//! Mutable state of one growth attempt.

use crate::dfg::Dfg;
use crate::grammar::RuleKind;
use crate::recipe::Recipe;
use crate::routing::Path;
use dfgen_fabric::FabricNode;

/// The DFG under construction together with its pattern counters.
///
/// A node is "used" exactly when it belongs to the DFG, so the used set and
/// the graph can never disagree. Each attempt owns its state; nothing is
/// shared between attempts.
#[derive(Debug, Clone, Default)]
pub struct GrowthState {
    dfg: Dfg,
    reconvergences_created: u32,
    convergences_created: u32,
    steps: u32,
}

impl GrowthState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding a single seed node.
    pub fn seeded(seed: FabricNode) -> Self {
        let mut state = Self::new();
        state.dfg.add_node(seed);
        state
    }

    /// Borrows the DFG.
    pub fn dfg(&self) -> &Dfg {
        &self.dfg
    }

    /// Consumes the state and returns the DFG.
    pub fn into_dfg(self) -> Dfg {
        self.dfg
    }

    /// Number of used nodes.
    pub fn used_count(&self) -> usize {
        self.dfg.node_count()
    }

    /// Returns whether `node` is already part of the DFG.
    pub fn is_used(&self, node: FabricNode) -> bool {
        self.dfg.contains_node(node)
    }

    /// Iterates over used nodes in claim order.
    pub fn used_nodes(&self) -> impl Iterator<Item = FabricNode> + '_ {
        self.dfg.nodes()
    }

    /// Reconvergence patterns committed so far.
    pub fn reconvergences(&self) -> u32 {
        self.reconvergences_created
    }

    /// Convergence patterns committed so far.
    pub fn convergences(&self) -> u32 {
        self.convergences_created
    }

    /// Growth steps attempted so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Returns whether the pattern counters satisfy `recipe`.
    pub fn fulfills(&self, recipe: &Recipe) -> bool {
        recipe.is_fulfilled(self.reconvergences_created, self.convergences_created)
    }

    /// Commits the paths produced by one rule and bumps its counter.
    pub fn commit(&mut self, kind: RuleKind, paths: &[Path]) {
        self.commit_paths(paths);
        match kind {
            RuleKind::Tree => {}
            RuleKind::Convergence => self.convergences_created += 1,
            RuleKind::Reconvergence => self.reconvergences_created += 1,
        }
    }

    /// Claims every node on `paths` and adds their edges.
    pub(crate) fn commit_paths(&mut self, paths: &[Path]) {
        for path in paths {
            self.dfg.add_path(path);
        }
    }

    /// Adds a single edge between two used nodes.
    pub(crate) fn add_edge(&mut self, from: FabricNode, to: FabricNode) -> bool {
        self.dfg.add_edge(from, to)
    }

    pub(crate) fn begin_step(&mut self) {
        self.steps += 1;
    }
}
