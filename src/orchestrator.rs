use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::chunk::{record_trial, run_chunk, ChunkSpec, EquityAccumulator};
use crate::error::{PloError, PloResult};
use crate::eval_cache::EvalCache;
use crate::planner::{plan, PlannerConfig};
use crate::request::{hand_notation, EquityReport, PlayerEquity, SimulationRequest, BOARD_SIZE};
use crate::sampler::BoardSampler;

/// Advisory progress callback: (trials completed, trials planned).
pub type ProgressFn = dyn Fn(u64, u64) + Send + Sync;

/// External cancellation signal, polled between chunk dispatches.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Knobs for one simulation run, beyond the request itself.
#[derive(Clone, Default)]
pub struct SimOptions {
    /// Seeds every chunk deterministically when set; otherwise each run
    /// draws a fresh base seed.
    pub seed: Option<u64>,
    pub cancel: Option<CancelToken>,
    pub progress: Option<Arc<ProgressFn>>,
    /// When cancelled, report the chunks that did complete instead of
    /// failing. Off by default: cancellation is a hard failure unless the
    /// caller explicitly opts into approximate results.
    pub best_effort_on_cancel: bool,
    pub planner: PlannerConfig,
}

/// Orchestration phases, logged as the request moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Planned,
    Dispatched,
    Collecting,
    Reduced,
    Done,
    Failed,
}

fn enter(phase: Phase) {
    log::debug!("orchestrator phase: {:?}", phase);
}

/// Runs a full equity calculation: validate, plan, fan chunks out across
/// a worker pool, reduce, report.
///
/// A single failed chunk fails the whole request; equity numbers from a
/// partially failed run are not meaningful. Reduction happens on the
/// calling thread only, after workers finish, so chunk completion order
/// never affects the result.
pub fn calculate_equity(
    request: &SimulationRequest,
    options: &SimOptions,
) -> PloResult<EquityReport> {
    request.validate()?;

    if request.is_fully_resolved() {
        return resolve_showdown(request);
    }

    let workload = plan(
        &options.planner,
        request.iterations,
        request.active_players(),
        request.known_board_cards(),
        request.quick,
    );
    enter(Phase::Planned);

    let sampler = BoardSampler::new(request)?;
    let base_seed = options.seed.unwrap_or_else(rand::random);

    let mut specs: Vec<ChunkSpec> = Vec::new();
    let mut remaining = workload.iterations;
    while remaining > 0 {
        let trials = remaining.min(workload.chunk_size);
        specs.push(ChunkSpec {
            trials,
            // distinct stream per chunk; deterministic under a fixed seed
            seed: base_seed.wrapping_add(specs.len() as u64),
        });
        remaining -= trials;
    }
    enter(Phase::Dispatched);

    let total = workload.iterations;
    let completed = AtomicU64::new(0);
    let cancel = options.cancel.clone();
    let progress = options.progress.clone();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workload.workers)
        .build()
        .map_err(|e| PloError::WorkerFailure(e.to_string()))?;

    enter(Phase::Collecting);
    let results: Vec<PloResult<EquityAccumulator>> = pool.install(|| {
        specs
            .par_iter()
            .map(|spec| {
                if cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                    return Err(PloError::Cancelled {
                        completed: completed.load(Ordering::Relaxed),
                        total,
                    });
                }
                let acc = run_chunk(request, &sampler, *spec)?;
                let done = completed.fetch_add(spec.trials, Ordering::Relaxed) + spec.trials;
                if let Some(report) = &progress {
                    report(done, total);
                }
                Ok(acc)
            })
            .collect()
    });

    let mut merged = EquityAccumulator::new(request.hands.len());
    let mut cancelled: Option<PloError> = None;
    for result in results {
        match result {
            Ok(acc) => merged.merge(&acc),
            Err(err @ PloError::Cancelled { .. }) => cancelled = Some(err),
            Err(err) => {
                enter(Phase::Failed);
                return Err(err);
            }
        }
    }

    if let Some(err) = cancelled {
        if !(options.best_effort_on_cancel && merged.trials > 0) {
            enter(Phase::Failed);
            return Err(err);
        }
        log::debug!(
            "cancelled with best-effort opt-in: reporting {} of {} trials",
            merged.trials,
            total
        );
    }
    enter(Phase::Reduced);

    let report = build_report(request, &merged);
    enter(Phase::Done);
    Ok(report)
}

/// Early-termination path: every board is already dealt out, so one
/// deterministic evaluation settles the pot. Monte Carlo sampling of
/// zero unknowns is wasted work.
fn resolve_showdown(request: &SimulationRequest) -> PloResult<EquityReport> {
    let active: Vec<usize> = request
        .hands
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.folded)
        .map(|(i, _)| i)
        .collect();

    let boards: Vec<[_; BOARD_SIZE]> = request
        .boards
        .iter()
        .map(|b| [b[0], b[1], b[2], b[3], b[4]])
        .collect();

    let mut acc = EquityAccumulator::new(request.hands.len());
    let mut cache = EvalCache::new();
    record_trial(&mut acc, request, &active, &boards, &mut cache)?;
    Ok(build_report(request, &acc))
}

fn build_report(request: &SimulationRequest, acc: &EquityAccumulator) -> EquityReport {
    let trials = acc.trials as f64;
    let double = request.is_double_board();
    let players = request
        .hands
        .iter()
        .enumerate()
        .map(|(i, hand)| PlayerEquity {
            hand: hand_notation(&hand.cards),
            folded: hand.folded,
            win_fraction: acc.wins[i] as f64 / trials,
            split_fraction: acc.split_equity[i] / trials,
            scoop_fraction: double.then(|| acc.scoops[i] as f64 / trials),
        })
        .collect();

    EquityReport {
        players,
        trials: acc.trials,
        double_board: double,
    }
}
