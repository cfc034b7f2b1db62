//! Parsing and validation of `campaign.toml` files.
//!
//! A campaign file describes a sweep over graph sizes, architecture sizes,
//! interconnects (or QCA schemes) and difficulty levels. Every section and
//! every field is optional; omitted values fall back to the standard
//! campaign: 500 graphs per difficulty (50 for graphs of at most 5 nodes),
//! difficulties 1 to 20, sizes 3 to 16, 4x4 and 8x8 arrays, mesh-only and
//! fully connected interconnects.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, validate_config};
pub use types::*;
