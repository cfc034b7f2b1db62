//! Parameters of a single grammar growth run.

use crate::error::{GenResult, GenerationError};
use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};

/// Default step ceiling of one growth attempt.
pub const DEFAULT_GROWTH_TIMEOUT: u32 = 200;

/// Default bound on path length (edges) for every search.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 15;

/// Default fan-in/fan-out branching range.
pub const DEFAULT_K_RANGE: KRange = KRange { min: 2, max: 3 };

/// Inclusive range of branching factors for fan-out and fan-in rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KRange {
    /// Smallest branching factor (at least 1).
    pub min: u32,
    /// Largest branching factor.
    pub max: u32,
}

impl KRange {
    /// Creates a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidParams`] if `min` is zero or exceeds `max`.
    pub fn new(min: u32, max: u32) -> GenResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Checks `1 <= min <= max`.
    pub fn validate(&self) -> GenResult<()> {
        if self.min == 0 || self.min > self.max {
            return Err(GenerationError::InvalidParams(format!(
                "k range ({}, {}) must satisfy 1 <= min <= max",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for KRange {
    fn default() -> Self {
        DEFAULT_K_RANGE
    }
}

/// Everything a [`Grammar`](crate::grammar::Grammar) needs besides the fabric.
#[derive(Clone, Debug, PartialEq)]
pub struct GrammarParams {
    /// Pattern counts the grown DFG must reach.
    pub recipe: Recipe,
    /// Branching-factor range.
    pub k_range: KRange,
    /// Exact node count of an accepted DFG.
    pub target_size: usize,
    /// Longest allowed path, in edges.
    pub max_path_length: usize,
    /// Skip border extension during post-processing.
    pub no_extend_io: bool,
    /// Step ceiling of one attempt.
    pub growth_timeout: u32,
}

impl GrammarParams {
    /// Creates parameters with default k range, path bound and timeout.
    pub fn new(target_size: usize, recipe: Recipe) -> Self {
        Self {
            recipe,
            k_range: DEFAULT_K_RANGE,
            target_size,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            no_extend_io: false,
            growth_timeout: DEFAULT_GROWTH_TIMEOUT,
        }
    }

    /// Checks the parameters for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidParams`] for a zero target size, a
    /// zero path bound or an invalid k range.
    pub fn validate(&self) -> GenResult<()> {
        self.k_range.validate()?;
        if self.target_size == 0 {
            return Err(GenerationError::InvalidParams(
                "target size must be at least 1".to_string(),
            ));
        }
        if self.max_path_length == 0 {
            return Err(GenerationError::InvalidParams(
                "max path length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_range_validation() {
        assert!(KRange::new(2, 3).is_ok());
        assert!(KRange::new(1, 1).is_ok());
        assert!(KRange::new(0, 3).is_err());
        assert!(KRange::new(4, 3).is_err());
    }

    #[test]
    fn defaults() {
        let params = GrammarParams::new(8, Recipe::EMPTY);
        assert_eq!(params.k_range, KRange { min: 2, max: 3 });
        assert_eq!(params.max_path_length, 15);
        assert_eq!(params.growth_timeout, 200);
        assert!(!params.no_extend_io);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn zero_target_rejected() {
        let params = GrammarParams::new(0, Recipe::EMPTY);
        assert!(matches!(
            params.validate(),
            Err(GenerationError::InvalidParams(_))
        ));
    }
}
