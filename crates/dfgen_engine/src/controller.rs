//! Batch generation: retries, initiation intervals and difficulty fallback.
//!
//! A [`GenerationTask`] asks for `count` graphs of one technology, mode and
//! difficulty. In grammar mode each attempt samples a target size from the
//! graph range and an architecture size from the list, builds (or reuses) the
//! matching fabric, and runs one growth attempt. The loop stops after
//! `count * retries_multiplier` attempts. If a difficulty above 1 produced
//! nothing at all, the remaining quota is retried once at the difficulty
//! below and those graphs are tagged as fallback.

use crate::constructive::{ConstructiveGenerator, DEFAULT_MAX_ATTEMPTS, DEFAULT_ROUTING_ALPHA};
use crate::dfg::Dfg;
use crate::error::{GenResult, GenerationError};
use crate::grammar::{Grammar, DEFAULT_MERGE_ALPHA};
use crate::params::{GrammarParams, KRange, DEFAULT_GROWTH_TIMEOUT, DEFAULT_MAX_PATH_LENGTH};
use crate::recipe::{recipe_for, Recipe};
use dfgen_fabric::{load_fabric, Fabric, FabricSpec, Interconnect, QcaScheme, Technology};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Default attempt multiplier: a batch of `k` gets `k * 150` attempts.
pub const DEFAULT_RETRIES_MULTIPLIER: usize = 150;

/// How graphs are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    /// Rule-based growth with recipe control.
    Grammar,
    /// Random placement and routing (CGRA only).
    Random,
}

impl GenerationMode {
    /// Lowercase name used in paths and flags.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grammar => "grammar",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grammar" => Ok(Self::Grammar),
            "random" => Ok(Self::Random),
            other => Err(GenerationError::InvalidParams(format!(
                "unknown generation mode '{other}'"
            ))),
        }
    }
}

/// Technology-specific fabric settings of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TechnologyParams {
    /// CGRA interconnect and optional fixed initiation interval.
    Cgra {
        /// Spatial interconnect features.
        interconnect: Interconnect,
        /// Fixed II; derived from the target size when `None`.
        ii: Option<u32>,
    },
    /// QCA clocking scheme.
    Qca {
        /// Clocking scheme.
        scheme: QcaScheme,
    },
}

impl TechnologyParams {
    /// The technology these settings describe.
    pub fn technology(&self) -> Technology {
        match self {
            Self::Cgra { .. } => Technology::Cgra,
            Self::Qca { .. } => Technology::Qca,
        }
    }
}

/// Everything a generation task needs.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskConfig {
    /// Technology and fabric settings.
    pub technology: TechnologyParams,
    /// Generation mode.
    pub mode: GenerationMode,
    /// Number of graphs requested.
    pub count: usize,
    /// Requested difficulty (grammar mode).
    pub difficulty: u32,
    /// Candidate architecture sizes `(rows, cols)`; one is sampled per attempt.
    pub arch_sizes: Vec<(u32, u32)>,
    /// Inclusive node-count range; the target size is sampled from it.
    pub graph_range: (usize, usize),
    /// Branching-factor range.
    pub k_range: KRange,
    /// Longest allowed path, in edges.
    pub max_path_length: usize,
    /// Skip border extension for QCA.
    pub no_extend_io: bool,
    /// Step ceiling of one growth attempt.
    pub growth_timeout: u32,
    /// Attempt ceiling multiplier for grammar mode.
    pub retries_multiplier: usize,
    /// Pair-routing probability for random mode.
    pub alpha: f64,
    /// Merge probability for QCA post-processing.
    pub merge_alpha: f64,
    /// Attempt ceiling per graph in random mode.
    pub random_max_attempts: usize,
}

impl TaskConfig {
    /// A grammar task with default tuning.
    pub fn new(technology: TechnologyParams, count: usize, difficulty: u32) -> Self {
        Self {
            technology,
            mode: GenerationMode::Grammar,
            count,
            difficulty,
            arch_sizes: vec![(4, 4)],
            graph_range: (8, 10),
            k_range: KRange::default(),
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            no_extend_io: false,
            growth_timeout: DEFAULT_GROWTH_TIMEOUT,
            retries_multiplier: DEFAULT_RETRIES_MULTIPLIER,
            alpha: DEFAULT_ROUTING_ALPHA,
            merge_alpha: DEFAULT_MERGE_ALPHA,
            random_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Checks ranges and mode support.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidParams`] for empty or inverted ranges
    /// and [`GenerationError::UnsupportedMode`] for random QCA tasks.
    pub fn validate(&self) -> GenResult<()> {
        let invalid = |msg: String| Err(GenerationError::InvalidParams(msg));
        if self.mode == GenerationMode::Random && self.technology.technology() == Technology::Qca
        {
            return Err(GenerationError::UnsupportedMode {
                mode: self.mode.to_string(),
                technology: Technology::Qca,
            });
        }
        if self.difficulty == 0 {
            return invalid("difficulty must be at least 1".to_string());
        }
        if self.arch_sizes.is_empty() {
            return invalid("at least one architecture size is required".to_string());
        }
        if let Some(&(r, c)) = self.arch_sizes.iter().find(|&&(r, c)| r == 0 || c == 0) {
            return invalid(format!("architecture size {r}x{c} is empty"));
        }
        let (lo, hi) = self.graph_range;
        if lo == 0 || lo > hi {
            return invalid(format!("graph range ({lo}, {hi}) must satisfy 1 <= min <= max"));
        }
        self.k_range.validate()?;
        if self.max_path_length == 0 {
            return invalid("max path length must be at least 1".to_string());
        }
        if self.retries_multiplier == 0 {
            return invalid("retries multiplier must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.alpha) || !(0.0..=1.0).contains(&self.merge_alpha) {
            return invalid("alpha values must lie within [0, 1]".to_string());
        }
        if let TechnologyParams::Cgra { ii: Some(0), .. } = self.technology {
            return invalid("initiation interval must be at least 1".to_string());
        }
        Ok(())
    }

    /// Initiation interval for a CGRA attempt: the fixed value, or the
    /// smallest II whose slot count holds `target` nodes.
    fn initiation_interval(&self, target: usize, rows: u32, cols: u32) -> Option<u32> {
        match self.technology {
            TechnologyParams::Cgra { ii: Some(ii), .. } => Some(ii),
            TechnologyParams::Cgra { ii: None, .. } => {
                let per_slot = (rows as usize) * (cols as usize);
                Some(target.div_ceil(per_slot).max(1) as u32)
            }
            TechnologyParams::Qca { .. } => None,
        }
    }

    fn fabric_spec(&self, rows: u32, cols: u32, ii: Option<u32>) -> FabricSpec {
        match self.technology {
            TechnologyParams::Cgra { interconnect, .. } => FabricSpec::Cgra {
                rows,
                cols,
                interconnect,
                ii: ii.unwrap_or(1),
            },
            TechnologyParams::Qca { scheme } => FabricSpec::Qca { rows, cols, scheme },
        }
    }
}

/// One accepted graph and the conditions it was produced under.
#[derive(Debug, Clone)]
pub struct GeneratedGraph {
    /// The data-flow graph.
    pub dfg: Dfg,
    /// Architecture size `(rows, cols)`.
    pub arch_size: (u32, u32),
    /// Initiation interval used (CGRA only).
    pub ii: Option<u32>,
    /// Effective difficulty.
    pub difficulty: u32,
    /// Effective recipe (grammar mode only).
    pub recipe: Option<Recipe>,
    /// Produced by the difficulty fallback.
    pub fallback: bool,
    /// 1-based position within the task.
    pub index: usize,
}

impl GeneratedGraph {
    /// Smallest II that fits the graph on its architecture, for reporting.
    pub fn ii_required(&self) -> u32 {
        let (rows, cols) = self.arch_size;
        let per_slot = (rows as usize * cols as usize).max(1);
        self.dfg.node_count().div_ceil(per_slot).max(1) as u32
    }
}

/// Result of a task: possibly fewer graphs than requested.
#[derive(Debug, Clone, Default)]
pub struct TaskReport {
    /// Requested graph count.
    pub requested: usize,
    /// Accepted graphs in production order.
    pub graphs: Vec<GeneratedGraph>,
    /// Attempts spent, fallback included.
    pub attempts: usize,
}

impl TaskReport {
    /// Returns `true` if every requested graph was produced.
    pub fn is_complete(&self) -> bool {
        self.graphs.len() >= self.requested
    }

    /// Number of graphs produced through the fallback.
    pub fn fallback_count(&self) -> usize {
        self.graphs.iter().filter(|g| g.fallback).count()
    }
}

/// A validated generation task.
#[derive(Debug, Clone)]
pub struct GenerationTask {
    config: TaskConfig,
}

type FabricCache = HashMap<(u32, u32, Option<u32>), Box<dyn Fabric>>;

impl GenerationTask {
    /// Validates `config` and wraps it.
    ///
    /// # Errors
    ///
    /// Propagates [`TaskConfig::validate`] failures.
    pub fn new(config: TaskConfig) -> GenResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The task's configuration.
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Runs the task to completion.
    ///
    /// A partial batch is not an error; check [`TaskReport::is_complete`].
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] only for fabric misconfiguration.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> GenResult<TaskReport> {
        let report = match self.config.mode {
            GenerationMode::Grammar => self.run_grammar(rng)?,
            GenerationMode::Random => self.run_random(rng)?,
        };
        if !report.is_complete() {
            warn!(
                requested = report.requested,
                generated = report.graphs.len(),
                "batch finished with fewer graphs than requested"
            );
        }
        Ok(report)
    }

    fn run_grammar<R: Rng + ?Sized>(&self, rng: &mut R) -> GenResult<TaskReport> {
        let cfg = &self.config;
        let mut report = TaskReport {
            requested: cfg.count,
            ..TaskReport::default()
        };
        let mut fabrics = FabricCache::new();

        let recipe = level_recipe(cfg.difficulty)?;
        info!(difficulty = cfg.difficulty, %recipe, count = cfg.count, "starting grammar batch");
        self.generation_loop(&mut fabrics, cfg.difficulty, recipe, cfg.count, false, rng, &mut report)?;

        if report.graphs.is_empty() && cfg.difficulty > 1 && cfg.count > 0 {
            let lower = cfg.difficulty - 1;
            let recipe = level_recipe(lower)?;
            warn!(
                difficulty = cfg.difficulty,
                fallback = lower,
                "no graph accepted, falling back to lower difficulty"
            );
            self.generation_loop(&mut fabrics, lower, recipe, cfg.count, true, rng, &mut report)?;
        }
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn generation_loop<R: Rng + ?Sized>(
        &self,
        fabrics: &mut FabricCache,
        difficulty: u32,
        recipe: Recipe,
        quota: usize,
        fallback: bool,
        rng: &mut R,
        report: &mut TaskReport,
    ) -> GenResult<usize> {
        let cfg = &self.config;
        let max_attempts = quota.saturating_mul(cfg.retries_multiplier);
        let mut saved = 0;
        let mut attempts = 0;

        while saved < quota && attempts < max_attempts {
            attempts += 1;
            let target = rng.gen_range(cfg.graph_range.0..=cfg.graph_range.1);
            let Some(&(rows, cols)) = cfg.arch_sizes.choose(rng) else {
                break;
            };
            let ii = cfg.initiation_interval(target, rows, cols);
            let fabric = cached_fabric(fabrics, cfg.fabric_spec(rows, cols, ii), (rows, cols, ii))?;

            let params = GrammarParams {
                recipe,
                k_range: cfg.k_range,
                target_size: target,
                max_path_length: cfg.max_path_length,
                no_extend_io: cfg.no_extend_io,
                growth_timeout: cfg.growth_timeout,
            };
            let grammar = Grammar::new(fabric, params)?;
            match grammar.generate(rng) {
                Ok(mut state) => {
                    if fabric.technology() == Technology::Qca {
                        grammar.post_process(&mut state, cfg.merge_alpha, rng);
                    }
                    saved += 1;
                    let index = report.graphs.len() + 1;
                    debug!(index, attempt = attempts, fabric = %fabric.label(), "graph accepted");
                    report.graphs.push(GeneratedGraph {
                        dfg: state.into_dfg(),
                        arch_size: (rows, cols),
                        ii,
                        difficulty,
                        recipe: Some(recipe),
                        fallback,
                        index,
                    });
                }
                Err(rejection) => debug!(attempt = attempts, %rejection, "attempt rejected"),
            }
        }
        report.attempts += attempts;
        info!(difficulty, saved, attempts, fallback, "grammar loop finished");
        Ok(saved)
    }

    fn run_random<R: Rng + ?Sized>(&self, rng: &mut R) -> GenResult<TaskReport> {
        let cfg = &self.config;
        let mut report = TaskReport {
            requested: cfg.count,
            ..TaskReport::default()
        };
        let mut fabrics = FabricCache::new();
        info!(count = cfg.count, alpha = cfg.alpha, "starting random batch");

        for _ in 0..cfg.count {
            let size = rng.gen_range(cfg.graph_range.0..=cfg.graph_range.1);
            let Some(&(rows, cols)) = cfg.arch_sizes.choose(rng) else {
                break;
            };
            let ii = cfg.initiation_interval(size, rows, cols);
            let fabric = cached_fabric(&mut fabrics, cfg.fabric_spec(rows, cols, ii), (rows, cols, ii))?;

            let mapping = ConstructiveGenerator::new(fabric, size, cfg.alpha)
                .and_then(|generator| generator.generate_mapping(cfg.random_max_attempts, rng));
            report.attempts += 1;
            match mapping {
                Ok(mapping) => {
                    let index = report.graphs.len() + 1;
                    report.graphs.push(GeneratedGraph {
                        dfg: mapping.to_dfg(),
                        arch_size: (rows, cols),
                        ii,
                        difficulty: cfg.difficulty,
                        recipe: None,
                        fallback: false,
                        index,
                    });
                }
                Err(err) => warn!(%err, size, "random generator gave up"),
            }
        }
        Ok(report)
    }
}

fn level_recipe(difficulty: u32) -> GenResult<Recipe> {
    recipe_for(difficulty).ok_or_else(|| {
        GenerationError::InvalidParams(format!("no recipe for difficulty {difficulty}"))
    })
}

fn cached_fabric(
    fabrics: &mut FabricCache,
    spec: FabricSpec,
    key: (u32, u32, Option<u32>),
) -> GenResult<&dyn Fabric> {
    let fabric = match fabrics.entry(key) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(load_fabric(&spec)?),
    };
    Ok(&**fabric)
}
