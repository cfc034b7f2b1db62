//! Grammar-based DFG growth.
//!
//! A growth attempt seeds one random fabric node and then repeatedly applies
//! rules until the DFG reaches the target size, the step ceiling is hit, or no
//! rule applies. Recipe rules (reconvergence, convergence) are tried first in
//! random order while their counts are short; the tree rule is the fallback.
//!
//! An attempt is accepted only if the DFG has exactly `target_size` nodes and
//! the recipe is fulfilled. Rejections are cheap and expected; the
//! controller simply retries with the same random stream.

mod postprocess;
mod rules;

pub use postprocess::{extend_io_to_border, merge, DEFAULT_MERGE_ALPHA};
pub use rules::{propose, RuleContext, RuleKind, MAX_TREE_START_ATTEMPTS};

use crate::error::{GenResult, Rejection};
use crate::params::GrammarParams;
use crate::state::GrowthState;
use dfgen_fabric::{Fabric, FabricNode};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

/// A growth engine bound to one fabric and one parameter set.
#[derive(Debug)]
pub struct Grammar<'a> {
    fabric: &'a dyn Fabric,
    params: GrammarParams,
}

impl<'a> Grammar<'a> {
    /// Creates a grammar after validating `params`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidParams`](crate::GenerationError::InvalidParams)
    /// for inconsistent parameters.
    pub fn new(fabric: &'a dyn Fabric, params: GrammarParams) -> GenResult<Self> {
        params.validate()?;
        Ok(Self { fabric, params })
    }

    /// The parameters this grammar grows with.
    pub fn params(&self) -> &GrammarParams {
        &self.params
    }

    /// The fabric this grammar grows on.
    pub fn fabric(&self) -> &'a dyn Fabric {
        self.fabric
    }

    /// Runs one growth attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] if the fabric is empty, the final size differs
    /// from the target, or the recipe was not met.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GrowthState, Rejection> {
        let nodes: Vec<FabricNode> = self.fabric.graph().nodes().collect();
        let seed = *nodes.choose(rng).ok_or(Rejection::EmptyFabric)?;
        let mut state = GrowthState::seeded(seed);
        trace!(%seed, "seeded growth");

        while state.used_count() < self.params.target_size
            && state.steps() < self.params.growth_timeout
        {
            if self.apply_pattern(&mut state, rng).is_none() {
                debug!(
                    used = state.used_count(),
                    target = self.params.target_size,
                    "no rule could be applied"
                );
                break;
            }
        }

        let target = self.params.target_size;
        if state.used_count() != target {
            return Err(Rejection::SizeMismatch {
                reached: state.used_count(),
                target,
            });
        }
        if !state.fulfills(&self.params.recipe) {
            return Err(Rejection::RecipeUnmet {
                recipe: self.params.recipe,
                reconvergences: state.reconvergences(),
                convergences: state.convergences(),
            });
        }
        Ok(state)
    }

    /// Applies one rule to `state` and returns which one fired.
    ///
    /// Returns `None` when nothing can grow: the budget is spent or no rule
    /// found a valid batch.
    pub fn apply_pattern<R: Rng + ?Sized>(
        &self,
        state: &mut GrowthState,
        rng: &mut R,
    ) -> Option<RuleKind> {
        state.begin_step();
        let budget = self.params.target_size.saturating_sub(state.used_count());
        if budget == 0 {
            return None;
        }
        let ctx = RuleContext::new(self.fabric.graph(), &self.params);
        let recipe = self.params.recipe;

        let mut kinds = Vec::with_capacity(3);
        if state.reconvergences() < recipe.reconvergence {
            kinds.push(RuleKind::Reconvergence);
        }
        if state.convergences() < recipe.convergence {
            kinds.push(RuleKind::Convergence);
        }
        kinds.shuffle(rng);
        kinds.push(RuleKind::Tree);

        for kind in kinds {
            if let Some(paths) = propose(kind, &ctx, state, budget, rng) {
                trace!(rule = %kind, paths = paths.len(), "rule applied");
                state.commit(kind, &paths);
                return Some(kind);
            }
        }
        None
    }

    /// Runs merge and, unless disabled, border extension on an accepted state.
    ///
    /// Border extension may add nodes beyond the target size.
    pub fn post_process<R: Rng + ?Sized>(
        &self,
        state: &mut GrowthState,
        merge_alpha: f64,
        rng: &mut R,
    ) {
        let graph = self.fabric.graph();
        merge(graph, state, merge_alpha, rng);
        if !self.params.no_extend_io {
            let extended = extend_io_to_border(
                graph,
                self.fabric.border_nodes(),
                state,
                self.params.max_path_length,
            );
            debug!(extended, "I/O nodes extended to border");
        }
    }
}
