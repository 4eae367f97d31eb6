//! Parallel evaluation of sweep candidates
//!
//! Every candidate becomes one task on a fixed-size worker pool. Tasks are
//! submitted without waiting; the runner then joins their handles in
//! submission order and finally sorts the records by threshold.

use crate::errors::{Result, ValidationError};
use crate::significance::{evaluate, trial_rng, EvaluationInputs};
use crate::sweep::candidates::candidates;
use crate::sweep::frequency::TermStatistics;
use crate::types::{Candidate, ScoreRecord, SweepConfig};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use tracing::{error, info, Span};

/// Pending result of one submitted task
#[derive(Debug)]
pub struct TaskHandle<T> {
    index: usize,
    receiver: Receiver<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Submission index of the task
    pub fn index(&self) -> usize {
        self.index
    }

    /// Block until the task finishes.
    ///
    /// A task that ended without reporting (its worker panicked) is a
    /// [`ValidationError::WorkerPool`] error.
    pub fn join(self) -> Result<T> {
        self.receiver.recv().map_err(|_| {
            ValidationError::worker_pool(format!("task {} ended without a result", self.index))
        })?
    }
}

/// Join every handle in submission order.
///
/// All tasks are waited on even after a failure; the first error is
/// returned once the last task has reported.
pub fn join_all<T>(handles: impl IntoIterator<Item = TaskHandle<T>>) -> Result<Vec<T>> {
    let mut results = Vec::new();
    let mut first_error = None;
    for handle in handles {
        match handle.join() {
            Ok(value) => results.push(value),
            Err(e) => {
                if first_error.is_none() {
                    error!(error = %e, "sweep task failed, draining remaining tasks");
                    first_error = Some(e);
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(results),
    }
}

/// Runs sweep candidates through the significance test on a worker pool
#[derive(Debug)]
pub struct SweepRunner {
    config: SweepConfig,
    span: Span,
}

impl SweepRunner {
    /// Create a runner with its own `sweep` span
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        let span = tracing::info_span!("sweep", workers = config.workers);
        Ok(Self { config, span })
    }

    /// Replace the span workers log under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Span every worker task runs in
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Evaluate the candidates of the configured policy
    pub fn run_policy(
        &self,
        inputs: Arc<EvaluationInputs>,
        stats: &TermStatistics,
    ) -> Result<Vec<ScoreRecord>> {
        self.run(inputs, candidates(stats, &self.config.policy))
    }

    /// Evaluate every candidate and return the records sorted by threshold.
    ///
    /// The pool lives for this call only and is dropped after every task has
    /// finished. The first failed task, in submission order, fails the sweep
    /// with its error.
    pub fn run(
        &self,
        inputs: Arc<EvaluationInputs>,
        candidates: impl IntoIterator<Item = Candidate>,
    ) -> Result<Vec<ScoreRecord>> {
        let _entered = self.span.enter();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("sweep-worker-{}", i))
            .panic_handler(|_| error!("sweep task panicked"))
            .build()
            .map_err(|e| ValidationError::worker_pool(e.to_string()))?;

        let handles: Vec<TaskHandle<ScoreRecord>> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| self.submit(&pool, index, candidate, Arc::clone(&inputs)))
            .collect();
        info!(tasks = handles.len(), "candidates submitted");

        let mut records = join_all(handles)?;
        records.sort_by(ScoreRecord::cmp_threshold);

        info!(records = records.len(), "sweep finished");
        Ok(records)
    }

    fn submit(
        &self,
        pool: &rayon::ThreadPool,
        index: usize,
        candidate: Candidate,
        inputs: Arc<EvaluationInputs>,
    ) -> TaskHandle<ScoreRecord> {
        let (sender, receiver) = sync_channel(1);
        let span = self.span.clone();
        let trials = self.config.significance.trials;
        let seed = self
            .config
            .significance
            .seed
            .map(|seed| seed.wrapping_add(index as u64));

        pool.spawn(move || {
            let result = span.in_scope(|| {
                let mut rng = trial_rng(seed);
                evaluate(
                    &inputs.corpus,
                    &candidate.keywords,
                    &inputs.reference,
                    trials,
                    candidate.threshold,
                    &mut rng,
                )
            });
            let _ = sender.send(result);
        });

        TaskHandle { index, receiver }
    }
}
