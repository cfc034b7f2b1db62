//! Error types for DFG generation.
//!
//! [`GenerationError`] covers failures that abort a task: bad parameters,
//! unbuildable fabrics and exhausted constructive retries. [`Rejection`]
//! describes why a single grammar growth attempt was discarded; rejections
//! are routine and are retried by the controller.

use crate::recipe::Recipe;
use dfgen_fabric::{FabricError, Technology};

/// Result alias for generation operations.
pub type GenResult<T> = Result<T, GenerationError>;

/// A failure that aborts a generation task.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The fabric description could not be built.
    #[error(transparent)]
    Fabric(#[from] FabricError),

    /// A parameter is out of range or inconsistent.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The generation mode is not available for the technology.
    #[error("generation mode '{mode}' is not supported for {technology}")]
    UnsupportedMode {
        /// The requested mode name.
        mode: String,
        /// The technology it was requested for.
        technology: Technology,
    },

    /// The constructive generator gave up.
    #[error("failed to find a valid mapping after {attempts} attempts")]
    NoValidMapping {
        /// Number of placement/routing attempts made.
        attempts: usize,
    },

    /// More operations were requested than the fabric has slots.
    #[error("cannot place {requested} operations on a fabric with {available} slots")]
    FabricTooSmall {
        /// Requested operation count.
        requested: usize,
        /// Available placement slots.
        available: usize,
    },
}

/// Why a grammar growth attempt was discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The fabric graph has no nodes to seed from.
    #[error("fabric has no nodes")]
    EmptyFabric,

    /// Growth stopped before or after the requested node count.
    #[error("grew {reached} of {target} nodes")]
    SizeMismatch {
        /// Nodes in the grown DFG.
        reached: usize,
        /// Requested node count.
        target: usize,
    },

    /// The requested pattern counts were not reached.
    #[error(
        "recipe {recipe} unmet (created {reconvergences} reconvergences, {convergences} convergences)"
    )]
    RecipeUnmet {
        /// The recipe that had to be satisfied.
        recipe: Recipe,
        /// Reconvergences actually created.
        reconvergences: u32,
        /// Convergences actually created.
        convergences: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fabric_errors_pass_through() {
        let err: GenerationError = FabricError::ZeroInitiationInterval.into();
        assert_eq!(format!("{err}"), "initiation interval must be at least 1");
    }

    #[test]
    fn display_unsupported_mode() {
        let err = GenerationError::UnsupportedMode {
            mode: "random".to_string(),
            technology: Technology::Qca,
        };
        assert_eq!(
            format!("{err}"),
            "generation mode 'random' is not supported for qca"
        );
    }

    #[test]
    fn display_rejections() {
        let err = Rejection::SizeMismatch {
            reached: 4,
            target: 6,
        };
        assert_eq!(format!("{err}"), "grew 4 of 6 nodes");

        let err = Rejection::RecipeUnmet {
            recipe: Recipe::new(1, 0),
            reconvergences: 0,
            convergences: 2,
        };
        assert!(format!("{err}").contains("created 0 reconvergences"));
    }
}
