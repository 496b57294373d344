//! Target execution engine.
//!
//! The engine walks the reachable sub-graph of the requested targets in
//! deterministic topological order, runs each action at most once, and
//! propagates failure only through result edges: a failed target blocks
//! its dependent closure while independent branches continue. The
//! optional parallel mode executes mutually-unordered targets stage by
//! stage on a bounded worker pool; stage boundaries are the join barrier.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::params::Redactor;
use crate::pipeline::{conditions_hold, ResolvedTarget, RunContext};
use crate::runner::artifacts;
use crate::runner::graph::TargetGraph;
use crate::runner::report::{ExecutionReport, FailureKind, TargetOutcome, TargetState};

/// Handle for requesting a cooperative abort.
///
/// Aborting never interrupts a running action; targets that have not
/// started transition to cancelled and nothing further is scheduled.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Create a fresh handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Which targets to skip cleanly.
#[derive(Debug, Clone, Default)]
pub enum SkipMode {
    /// Run everything in the sub-graph.
    #[default]
    None,
    /// Run only the requested targets; dependencies are assumed done.
    AllButRequested,
    /// Skip the named targets (folded case-insensitively).
    Named(HashSet<String>),
}

impl SkipMode {
    /// Parse the CLI `--skip` form: bare flag skips all dependencies,
    /// names skip just those targets.
    pub fn from_args(skip: Option<Vec<String>>) -> Self {
        match skip {
            None => Self::None,
            Some(names) if names.is_empty() => Self::AllButRequested,
            Some(names) => Self::Named(names.into_iter().map(|n| n.to_lowercase()).collect()),
        }
    }
}

/// Options for one engine run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Skip selection.
    pub skip: SkipMode,
    /// Evaluate gates and conditions but run no actions.
    pub dry_run: bool,
    /// Execute independent targets concurrently.
    pub parallel: bool,
    /// Worker bound for the parallel mode.
    pub max_parallel: usize,
    /// Scrubs secrets from every stored diagnostic.
    pub redactor: Redactor,
    /// Cooperative cancellation.
    pub abort: AbortHandle,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            skip: SkipMode::None,
            dry_run: false,
            parallel: false,
            max_parallel: 4,
            redactor: Redactor::new(),
            abort: AbortHandle::new(),
        }
    }
}

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A target's action is about to start.
    TargetStarting {
        name: &'a str,
        position: usize,
        total: usize,
    },
    /// A target reached a terminal state after evaluation.
    TargetFinished { outcome: &'a TargetOutcome },
    /// A target was gated without evaluation.
    TargetGated { name: &'a str, state: TargetState },
}

/// What target evaluation decided before any action ran.
enum Prepared {
    /// Terminal without running the action.
    Done(TargetOutcome),
    /// Gates passed; the action must execute.
    Run,
}

/// Executes a pipeline's targets.
pub struct Engine<'a> {
    targets: &'a [ResolvedTarget],
    graph: TargetGraph,
}

impl<'a> Engine<'a> {
    /// Build the engine, constructing and cycle-checking the graph.
    pub fn new(targets: &'a [ResolvedTarget]) -> Result<Self> {
        let graph = TargetGraph::from_targets(targets)?;
        Ok(Self { targets, graph })
    }

    /// The underlying graph.
    pub fn graph(&self) -> &TargetGraph {
        &self.graph
    }

    /// Run the requested targets.
    pub fn run(
        &self,
        requested: &[String],
        ctx: &RunContext,
        options: &RunOptions,
    ) -> Result<ExecutionReport> {
        self.run_with_progress(requested, ctx, options, |_| {})
    }

    /// Run the requested targets, emitting progress events.
    pub fn run_with_progress(
        &self,
        requested: &[String],
        ctx: &RunContext,
        options: &RunOptions,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<ExecutionReport> {
        let started_at = Utc::now();

        let roots = self.graph.indices_of(requested)?;
        let subset = self.graph.reachable_from(&roots);
        let skip_set = self.skip_set(&subset, &roots, &options.skip);

        let mut states: HashMap<usize, TargetState> =
            subset.iter().map(|&n| (n, TargetState::Pending)).collect();

        let outcomes = if options.parallel {
            self.run_stages(&subset, &skip_set, &mut states, ctx, options, &mut on_progress)?
        } else {
            self.run_sequential(&subset, &skip_set, &mut states, ctx, options, &mut on_progress)?
        };

        let success = roots
            .iter()
            .all(|root| !states.get(root).copied().unwrap_or(TargetState::Pending).blocks_dependents());

        Ok(ExecutionReport {
            requested: requested.to_vec(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
            success,
        })
    }

    fn skip_set(&self, subset: &[usize], roots: &[usize], mode: &SkipMode) -> HashSet<usize> {
        match mode {
            SkipMode::None => HashSet::new(),
            SkipMode::AllButRequested => {
                let requested: HashSet<usize> = roots.iter().copied().collect();
                subset
                    .iter()
                    .copied()
                    .filter(|n| !requested.contains(n))
                    .collect()
            }
            SkipMode::Named(names) => subset
                .iter()
                .copied()
                .filter(|&n| names.contains(&self.graph.name_of(n).to_lowercase()))
                .collect(),
        }
    }

    fn run_sequential(
        &self,
        subset: &[usize],
        skip_set: &HashSet<usize>,
        states: &mut HashMap<usize, TargetState>,
        ctx: &RunContext,
        options: &RunOptions,
        on_progress: &mut impl FnMut(RunProgress<'_>),
    ) -> Result<Vec<TargetOutcome>> {
        let order = self.graph.topological_order(subset)?;
        let total = order.len();
        let mut outcomes = Vec::with_capacity(total);

        for (position, &node) in order.iter().enumerate() {
            let name = self.graph.name_of(node);
            let outcome = match self.prepare(node, skip_set, states, ctx, options) {
                Prepared::Done(outcome) => {
                    if outcome.state != TargetState::Failed {
                        on_progress(RunProgress::TargetGated {
                            name,
                            state: outcome.state,
                        });
                    }
                    outcome
                }
                Prepared::Run => {
                    on_progress(RunProgress::TargetStarting {
                        name,
                        position,
                        total,
                    });
                    self.execute_action(node, ctx, options)
                }
            };

            states.insert(node, outcome.state);
            on_progress(RunProgress::TargetFinished { outcome: &outcome });
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    fn run_stages(
        &self,
        subset: &[usize],
        skip_set: &HashSet<usize>,
        states: &mut HashMap<usize, TargetState>,
        ctx: &RunContext,
        options: &RunOptions,
        on_progress: &mut impl FnMut(RunProgress<'_>),
    ) -> Result<Vec<TargetOutcome>> {
        let stages = self.graph.parallel_stages(subset);
        let total = subset.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut position = 0;

        for stage in stages {
            let mut runnable = Vec::new();

            for &node in &stage {
                let name = self.graph.name_of(node);
                match self.prepare(node, skip_set, states, ctx, options) {
                    Prepared::Done(outcome) => {
                        if outcome.state != TargetState::Failed {
                            on_progress(RunProgress::TargetGated {
                                name,
                                state: outcome.state,
                            });
                        }
                        states.insert(node, outcome.state);
                        on_progress(RunProgress::TargetFinished { outcome: &outcome });
                        outcomes.push(outcome);
                    }
                    Prepared::Run => {
                        on_progress(RunProgress::TargetStarting {
                            name,
                            position,
                            total,
                        });
                        runnable.push(node);
                    }
                }
                position += 1;
            }

            if runnable.is_empty() {
                continue;
            }

            let mut stage_outcomes = self.execute_stage(&runnable, ctx, options);
            stage_outcomes.sort_by_key(|(node, _)| *node);

            for (node, outcome) in stage_outcomes {
                states.insert(node, outcome.state);
                on_progress(RunProgress::TargetFinished { outcome: &outcome });
                outcomes.push(outcome);
            }
        }

        Ok(outcomes)
    }

    /// Run one stage's actions on a bounded worker pool.
    fn execute_stage(
        &self,
        runnable: &[usize],
        ctx: &RunContext,
        options: &RunOptions,
    ) -> Vec<(usize, TargetOutcome)> {
        if runnable.len() == 1 || options.max_parallel <= 1 {
            return runnable
                .iter()
                .map(|&node| (node, self.execute_action(node, ctx, options)))
                .collect();
        }

        let queue: Mutex<VecDeque<usize>> = Mutex::new(runnable.iter().copied().collect());
        let collected: Mutex<Vec<(usize, TargetOutcome)>> = Mutex::new(Vec::new());
        let workers = options.max_parallel.min(runnable.len());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let node = match queue.lock().unwrap().pop_front() {
                        Some(node) => node,
                        None => break,
                    };
                    let outcome = self.execute_action(node, ctx, options);
                    collected.lock().unwrap().push((node, outcome));
                });
            }
        });

        collected.into_inner().unwrap()
    }

    /// Evaluate gates in order: abort, blocked predecessors, skip
    /// selection, condition, required parameters.
    fn prepare(
        &self,
        node: usize,
        skip_set: &HashSet<usize>,
        states: &HashMap<usize, TargetState>,
        ctx: &RunContext,
        options: &RunOptions,
    ) -> Prepared {
        let target = &self.targets[node];

        if options.abort.is_aborted() {
            return Prepared::Done(TargetOutcome::new(&target.name, TargetState::Cancelled));
        }

        let blocked = self
            .graph
            .result_predecessors(node)
            .into_iter()
            .any(|pred| {
                states
                    .get(&pred)
                    .copied()
                    .unwrap_or(TargetState::Pending)
                    .blocks_dependents()
            });
        if blocked {
            debug!("target '{}' blocked by failed dependency", target.name);
            return Prepared::Done(TargetOutcome::new(&target.name, TargetState::Blocked));
        }

        // A consumer needs its producer's artifacts; a condition-skipped
        // producer leaves the consumer without inputs. A producer skipped
        // by request (--skip) is asserted already done, artifacts on disk.
        let producer_skipped = self.graph.consumed_producers(node).iter().any(|pred| {
            states.get(pred).copied() == Some(TargetState::Skipped) && !skip_set.contains(pred)
        });
        if producer_skipped {
            debug!("target '{}' blocked by skipped producer", target.name);
            return Prepared::Done(TargetOutcome::new(&target.name, TargetState::Blocked));
        }

        if skip_set.contains(&node) {
            return Prepared::Done(TargetOutcome::new(&target.name, TargetState::Skipped));
        }

        if !conditions_hold(&target.only_when, ctx) {
            debug!("target '{}' skipped: condition false", target.name);
            return Prepared::Done(TargetOutcome::new(&target.name, TargetState::Skipped));
        }

        for required in &target.requires {
            if !ctx.params.is_bound(required) {
                let mut outcome = TargetOutcome::new(&target.name, TargetState::Failed);
                outcome.kind = Some(FailureKind::Configuration);
                outcome.error = Some(format!(
                    "parameter '{}' is required but not set",
                    required
                ));
                return Prepared::Done(outcome);
            }
        }

        Prepared::Run
    }

    /// Run the action and the artifact check, producing a terminal outcome.
    fn execute_action(
        &self,
        node: usize,
        ctx: &RunContext,
        options: &RunOptions,
    ) -> TargetOutcome {
        let target = &self.targets[node];
        let mut outcome = TargetOutcome::new(&target.name, TargetState::Succeeded);

        if options.dry_run {
            return outcome;
        }

        let action = match &target.action {
            Some(action) => action,
            // Aggregation target: succeeds once its gates passed.
            None => return outcome,
        };

        debug!("running target '{}'", target.name);
        let start = Instant::now();
        let result = action.run(ctx);
        outcome.duration = Some(start.elapsed());

        if let Err(e) = result {
            warn!("target '{}' failed", target.name);
            outcome.state = TargetState::Failed;
            outcome.kind = Some(FailureKind::Execution);
            outcome.error = Some(options.redactor.redact(&e.to_string()));
            return outcome;
        }

        if let Err(e) = artifacts::verify(target, &ctx.project_root) {
            warn!("target '{}' violated its artifact contract", target.name);
            outcome.state = TargetState::Failed;
            outcome.kind = Some(FailureKind::ArtifactContract);
            outcome.error = Some(options.redactor.redact(&e.to_string()));
        }

        outcome
    }
}
