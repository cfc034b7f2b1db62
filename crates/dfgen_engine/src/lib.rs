//! DFG generation engines for spatial fabrics.
//!
//! This crate grows synthetic data-flow graphs directly on a
//! [`Fabric`](dfgen_fabric::Fabric), so every generated graph comes with a
//! valid placement: each operation sits on a distinct fabric node and every
//! edge follows physical connections.
//!
//! # Pipeline
//!
//! 1. **Recipe** — map a difficulty level to required pattern counts
//! 2. **Grow** — seed one node and apply tree, convergence and reconvergence
//!    rules until the exact target size is reached
//! 3. **Post-process** — for QCA, merge extra edges and extend I/O to the border
//! 4. **Control** — retry rejected attempts, derive the II, fall back one
//!    difficulty level when a batch produces nothing
//!
//! A secondary constructive mode places and randomly routes a fixed number
//! of operations on a CGRA.
//!
//! # Usage
//!
//! ```
//! use dfgen_engine::{Grammar, GrammarParams, Recipe};
//! use dfgen_fabric::{CgraFabric, Interconnect};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let fabric = CgraFabric::new(4, 4, Interconnect::MESH, 1).unwrap();
//! let grammar = Grammar::new(&fabric, GrammarParams::new(5, Recipe::EMPTY)).unwrap();
//! let mut rng = StdRng::seed_from_u64(0);
//! let accepted = (0..100).find_map(|_| grammar.generate(&mut rng).ok());
//! assert_eq!(accepted.map(|state| state.used_count()), Some(5));
//! ```

#![warn(missing_docs)]

pub mod campaign;
pub mod constructive;
pub mod controller;
pub mod dfg;
pub mod error;
pub mod grammar;
pub mod params;
pub mod recipe;
pub mod routing;
pub mod state;

pub use campaign::{run_tasks, task_rng, TaskSummary};
pub use constructive::{ConstructiveGenerator, Mapping};
pub use controller::{
    GeneratedGraph, GenerationMode, GenerationTask, TaskConfig, TaskReport, TechnologyParams,
};
pub use dfg::Dfg;
pub use error::{GenResult, GenerationError, Rejection};
pub use grammar::{Grammar, RuleKind};
pub use params::{GrammarParams, KRange};
pub use recipe::{generate_recipes, recipe_for, Recipe};
pub use routing::Path;
pub use state::GrowthState;
