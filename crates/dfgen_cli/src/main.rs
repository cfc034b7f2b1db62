//! dfgen — synthetic data-flow graph generator for CGRA and QCA fabrics.
//!
//! The binary exposes two subcommands:
//!
//! - `dfgen single` — generate one batch of graphs for one configuration
//! - `dfgen campaign` — sweep a dataset campaign in parallel

#![warn(missing_docs)]

mod campaign;
mod dot;
mod output;
mod single;

use clap::{Parser, Subcommand, ValueEnum};
use dfgen_engine::GenerationMode;
use dfgen_fabric::{Interconnect, QcaScheme};
use std::path::PathBuf;
use std::process;
use tracing::Level;

/// dfgen — grow data-flow graphs directly on spatial fabrics.
#[derive(Parser, Debug)]
#[command(
    name = "dfgen",
    version,
    about = "dfgen — grow placed and routed data-flow graphs on CGRA and QCA fabrics"
)]
pub struct Cli {
    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one batch of graphs.
    Single(SingleArgs),
    /// Run a dataset campaign.
    Campaign(CampaignArgs),
}

/// Target technology.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TechArg {
    /// Coarse-grained reconfigurable array.
    Cgra,
    /// Quantum-dot cellular automata.
    Qca,
}

/// Generation mode.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Grammar growth with difficulty control.
    Grammar,
    /// Random placement and routing (CGRA only).
    Random,
}

impl From<ModeArg> for GenerationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Grammar => GenerationMode::Grammar,
            ModeArg::Random => GenerationMode::Random,
        }
    }
}

/// Arguments for `dfgen single`.
#[derive(Parser, Debug)]
pub struct SingleArgs {
    /// Target technology.
    #[arg(long, value_enum, default_value_t = TechArg::Cgra)]
    pub tec: TechArg,

    /// Generation mode.
    #[arg(long, value_enum, default_value_t = ModeArg::Grammar)]
    pub gen_mode: ModeArg,

    /// Number of graphs to generate.
    #[arg(long, default_value_t = 10)]
    pub k_graphs: usize,

    /// Difficulty level (grammar mode).
    #[arg(long, default_value_t = 1)]
    pub difficulty: u32,

    /// Architecture size as ROWS COLS.
    #[arg(long, num_args = 2, value_names = ["ROWS", "COLS"], default_values_t = [4, 4])]
    pub arch_size: Vec<u32>,

    /// Inclusive node-count range as MIN MAX.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], default_values_t = [8, 10])]
    pub graph_range: Vec<usize>,

    /// CGRA interconnect bits in `mdht` order (mesh, diagonal, one-hop, toroidal).
    #[arg(long, default_value = "1000")]
    pub bits: Interconnect,

    /// Branching-factor range as MIN MAX.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], default_values_t = [2, 3])]
    pub k_range: Vec<u32>,

    /// Longest allowed path, in edges.
    #[arg(long, default_value_t = 15)]
    pub max_path_length: usize,

    /// QCA clocking scheme: U (USE), R (RES) or T (2DDWave).
    #[arg(long, default_value = "U")]
    pub qca_arch: QcaScheme,

    /// Skip extending QCA inputs and outputs to the border.
    #[arg(long)]
    pub no_extend_io: bool,

    /// Skip PNG rendering.
    #[arg(long)]
    pub no_images: bool,

    /// Fixed CGRA initiation interval; derived from the graph size if omitted.
    #[arg(long)]
    pub ii: Option<u32>,

    /// Output directory.
    #[arg(long, default_value = "results")]
    pub output_dir: String,

    /// Pair-routing probability for random mode.
    #[arg(long, default_value_t = 0.3)]
    pub alpha: f64,

    /// Edge-merge probability for QCA post-processing.
    #[arg(long, default_value_t = 0.15)]
    pub merge_alpha: f64,

    /// Attempt ceiling multiplier per requested graph.
    #[arg(long, default_value_t = 150)]
    pub retries_multiplier: usize,

    /// Step ceiling of one growth attempt.
    #[arg(long, default_value_t = 200)]
    pub growth_timeout: u32,

    /// Seed for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `dfgen campaign`.
#[derive(Parser, Debug)]
pub struct CampaignArgs {
    /// Campaign file; the standard campaign is used if omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory, overriding the campaign file.
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Skip PNG rendering.
    #[arg(long)]
    pub no_images: bool,

    /// Worker threads; defaults to one per core.
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Base seed, overriding the campaign file.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    /// Suppress progress output.
    pub quiet: bool,
    /// Enable debug logging.
    pub verbose: bool,
}

fn log_level(global: &GlobalArgs) -> Level {
    if global.quiet {
        Level::ERROR
    } else if global.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

fn main() {
    let cli = Cli::parse();
    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level(&global))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Command::Single(ref args) => single::run(args, &global),
        Command::Campaign(ref args) => campaign::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
