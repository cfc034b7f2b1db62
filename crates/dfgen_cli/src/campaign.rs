//! `dfgen campaign` — sweep sizes, architectures, interconnects and
//! difficulties in parallel.

use crate::output::OutputWriter;
use crate::{CampaignArgs, GlobalArgs};
use dfgen_config::{CampaignConfig, ModeKind, TechnologyKind};
use dfgen_engine::{run_tasks, GenResult, GenerationMode, KRange, TaskConfig, TechnologyParams};
use dfgen_fabric::{Interconnect, QcaScheme};
use rayon::ThreadPoolBuilder;
use tracing::{error, info};

/// Expands a campaign into independent tasks.
///
/// Order: graph size, architecture size, interconnect or clocking scheme,
/// then difficulty. Random-mode campaigns run a single difficulty level.
///
/// # Errors
///
/// Returns a [`GenerationError`](dfgen_engine::GenerationError) if an
/// interconnect, scheme or k-range in the configuration is malformed.
pub fn plan_tasks(config: &CampaignConfig) -> GenResult<Vec<TaskConfig>> {
    let campaign = &config.campaign;
    let grammar = &config.grammar;

    let variants: Vec<TechnologyParams> = match campaign.technology {
        TechnologyKind::Cgra => campaign
            .interconnects
            .iter()
            .map(|bits| {
                Ok(TechnologyParams::Cgra {
                    interconnect: Interconnect::from_bits(bits)?,
                    ii: campaign.ii,
                })
            })
            .collect::<GenResult<_>>()?,
        TechnologyKind::Qca => campaign
            .qca_schemes
            .iter()
            .map(|token| {
                Ok(TechnologyParams::Qca {
                    scheme: QcaScheme::from_token(token)?,
                })
            })
            .collect::<GenResult<_>>()?,
    };
    let (mode, max_difficulty) = match campaign.mode {
        ModeKind::Grammar => (GenerationMode::Grammar, campaign.max_difficulty),
        ModeKind::Random => (GenerationMode::Random, 1),
    };
    let k_range = KRange::new(grammar.k_range[0], grammar.k_range[1])?;

    let mut tasks = Vec::new();
    for &size in &campaign.graph_sizes {
        for &[rows, cols] in &campaign.arch_sizes {
            for &technology in &variants {
                for difficulty in 1..=max_difficulty {
                    let mut task =
                        TaskConfig::new(technology, campaign.graphs_for_size(size), difficulty);
                    task.mode = mode;
                    task.arch_sizes = vec![(rows, cols)];
                    task.graph_range = (size, size);
                    task.k_range = k_range;
                    task.max_path_length = grammar.max_path_length;
                    task.no_extend_io = grammar.no_extend_io;
                    task.growth_timeout = grammar.growth_timeout;
                    task.retries_multiplier = grammar.retries_multiplier;
                    task.alpha = campaign.alpha;
                    task.merge_alpha = grammar.merge_alpha;
                    tasks.push(task);
                }
            }
        }
    }
    Ok(tasks)
}

/// Runs the `dfgen campaign` command.
///
/// Returns exit code 0 if every task completed without error, 1 otherwise.
/// Partial batches are reported but do not fail the campaign.
pub fn run(args: &CampaignArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => dfgen_config::load_config(path)?,
        None => CampaignConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if args.no_images {
        config.output.images = false;
    }
    if args.seed.is_some() {
        config.campaign.seed = args.seed;
    }

    if let Some(jobs) = args.jobs {
        ThreadPoolBuilder::new().num_threads(jobs).build_global()?;
    }

    let tasks = plan_tasks(&config)?;
    let writer = OutputWriter::new(&config.output.dir, config.output.images);
    if !global.quiet {
        eprintln!(
            "  Running {} task(s) on {} thread(s) into {}",
            tasks.len(),
            rayon::current_num_threads(),
            writer.root().display()
        );
    }

    let summaries = run_tasks(&tasks, config.campaign.seed, |index, task, report| {
        if let Err(e) = writer.write_report(task, report) {
            error!("task {index}: failed to write output: {e}");
        }
    });

    let failed = summaries.iter().filter(|s| s.error.is_some()).count();
    let requested: usize = summaries.iter().map(|s| s.requested).sum();
    let generated: usize = summaries.iter().map(|s| s.generated).sum();
    info!("campaign produced {generated} of {requested} graph(s)");
    if !global.quiet {
        eprintln!(
            "    Finished {generated}/{requested} graph(s) across {} task(s), {failed} failed",
            summaries.len()
        );
    }

    Ok(if failed == 0 { 0 } else { 1 })
}
