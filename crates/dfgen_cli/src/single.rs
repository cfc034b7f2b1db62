//! `dfgen single` — one batch of graphs for one configuration.

use crate::output::OutputWriter;
use crate::{GlobalArgs, SingleArgs, TechArg};
use dfgen_engine::{task_rng, GenerationTask, KRange, TaskConfig, TechnologyParams};
use tracing::{info, warn};

/// Builds the task described by the command-line flags.
pub fn task_config(args: &SingleArgs) -> Result<TaskConfig, Box<dyn std::error::Error>> {
    let technology = match args.tec {
        TechArg::Cgra => TechnologyParams::Cgra {
            interconnect: args.bits,
            ii: args.ii,
        },
        TechArg::Qca => TechnologyParams::Qca {
            scheme: args.qca_arch,
        },
    };

    let mut config = TaskConfig::new(technology, args.k_graphs, args.difficulty);
    config.mode = args.gen_mode.into();
    config.arch_sizes = vec![(args.arch_size[0], args.arch_size[1])];
    config.graph_range = (args.graph_range[0], args.graph_range[1]);
    config.k_range = KRange::new(args.k_range[0], args.k_range[1])?;
    config.max_path_length = args.max_path_length;
    config.no_extend_io = args.no_extend_io;
    config.growth_timeout = args.growth_timeout;
    config.retries_multiplier = args.retries_multiplier;
    config.alpha = args.alpha;
    config.merge_alpha = args.merge_alpha;
    config.validate()?;
    Ok(config)
}

/// Runs the `dfgen single` command.
///
/// Returns exit code 0 if at least one graph was written, 1 otherwise.
pub fn run(args: &SingleArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = task_config(args)?;
    let task = GenerationTask::new(config)?;
    let writer = OutputWriter::new(&args.output_dir, !args.no_images);

    if !global.quiet {
        eprintln!(
            "  Generating {} {} graph(s) ({} mode, difficulty {})",
            args.k_graphs,
            task.config().technology.technology(),
            task.config().mode,
            args.difficulty
        );
    }

    let mut rng = task_rng(args.seed, 0);
    let report = task.run(&mut rng)?;
    let written = writer.write_report(task.config(), &report)?;
    info!(
        "{written} graph(s) written after {} attempt(s)",
        report.attempts
    );

    if !report.is_complete() {
        warn!(
            "produced {} of {} requested graph(s)",
            report.graphs.len(),
            report.requested
        );
    }
    if !global.quiet {
        eprintln!(
            "    Finished {written}/{} graph(s), {} via fallback, in {}",
            report.requested,
            report.fallback_count(),
            writer.root().display()
        );
    }

    Ok(if written == 0 { 1 } else { 0 })
}
