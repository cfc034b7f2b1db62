//! Parallel execution of independent generation tasks.
//!
//! Tasks share nothing: each one builds its own fabrics and draws from its
//! own [`StdRng`], seeded from the campaign seed plus the task index so a
//! seeded campaign is reproducible regardless of scheduling.

use crate::controller::{GenerationTask, TaskConfig, TaskReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info};

/// Outcome of one campaign task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    /// Position of the task in the campaign.
    pub index: usize,
    /// Graphs requested.
    pub requested: usize,
    /// Graphs produced and handed to the sink.
    pub generated: usize,
    /// Error message if the task aborted.
    pub error: Option<String>,
}

/// Random stream of task `index`.
///
/// With a campaign seed the stream is `seed + index`; without one it is
/// seeded from OS entropy.
pub fn task_rng(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Runs every task on the rayon pool and hands each report to `sink`.
///
/// `sink` runs on the worker that produced the report, so it must be
/// `Sync`. A failing task is logged and summarized; it never stops the
/// others. Summaries are returned in task order.
pub fn run_tasks<F>(tasks: &[TaskConfig], seed: Option<u64>, sink: F) -> Vec<TaskSummary>
where
    F: Fn(usize, &TaskConfig, &TaskReport) + Sync,
{
    let total = tasks.len();
    let finished = AtomicUsize::new(0);

    tasks
        .par_iter()
        .enumerate()
        .map(|(index, config)| {
            let mut rng = task_rng(seed, index);
            let outcome = GenerationTask::new(config.clone()).and_then(|task| task.run(&mut rng));
            let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
            match outcome {
                Ok(report) => {
                    sink(index, config, &report);
                    info!(
                        task = index,
                        done,
                        total,
                        generated = report.graphs.len(),
                        requested = report.requested,
                        "task complete"
                    );
                    TaskSummary {
                        index,
                        requested: report.requested,
                        generated: report.graphs.len(),
                        error: None,
                    }
                }
                Err(err) => {
                    error!(task = index, %err, "task failed");
                    TaskSummary {
                        index,
                        requested: config.count,
                        generated: 0,
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect()
}
