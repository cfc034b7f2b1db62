//! Difficulty levels and the pattern recipes they require.
//!
//! A recipe states how many reconvergence and convergence patterns a grown
//! DFG must contain. Difficulty 1 is the empty recipe; each following level
//! is derived from the previous one so that total pattern count never
//! decreases as difficulty rises.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Required pattern counts for one difficulty level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipe {
    /// Required reconvergence patterns (split then rejoin).
    pub reconvergence: u32,
    /// Required convergence patterns (several sources into one node).
    pub convergence: u32,
}

impl Recipe {
    /// The recipe of difficulty 1: no required patterns.
    pub const EMPTY: Recipe = Recipe {
        reconvergence: 0,
        convergence: 0,
    };

    /// Creates a recipe.
    pub fn new(reconvergence: u32, convergence: u32) -> Self {
        Self {
            reconvergence,
            convergence,
        }
    }

    /// Returns `true` if no pattern is required.
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Total number of required patterns.
    pub fn total(&self) -> u32 {
        self.reconvergence + self.convergence
    }

    /// Returns `true` once both counts reach the requirement.
    pub fn is_fulfilled(&self, reconvergences: u32, convergences: u32) -> bool {
        reconvergences >= self.reconvergence && convergences >= self.convergence
    }

    /// Derives the recipe of the next difficulty level.
    fn next(self) -> Self {
        let Self {
            reconvergence: r,
            convergence: c,
        } = self;
        if r == c {
            Self::new(r, c + 1)
        } else if c > r {
            Self::new(c, r)
        } else if r > c + 1 {
            Self::new(r, c + 1)
        } else {
            Self::new(c, r + 1)
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(reconvergence={}, convergence={})",
            self.reconvergence, self.convergence
        )
    }
}

/// Builds the recipe table for difficulties `1..=max_difficulty`.
///
/// Difficulty 1 is always present, even for `max_difficulty == 0`.
pub fn generate_recipes(max_difficulty: u32) -> BTreeMap<u32, Recipe> {
    let mut recipes = BTreeMap::new();
    let mut current = Recipe::EMPTY;
    recipes.insert(1, current);
    for level in 2..=max_difficulty {
        current = current.next();
        recipes.insert(level, current);
    }
    recipes
}

/// Returns the recipe for a single difficulty, or `None` for difficulty 0.
pub fn recipe_for(difficulty: u32) -> Option<Recipe> {
    if difficulty == 0 {
        return None;
    }
    (2..=difficulty).try_fold(Recipe::EMPTY, |recipe, _| Some(recipe.next()))
}
