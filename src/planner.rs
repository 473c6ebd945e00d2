use serde::{Deserialize, Serialize};

/// Named tunables for the workload heuristic. Any reasonable values
/// converge to the same expected equity; what the policy guarantees is
/// that effective iterations grow monotonically with requested
/// iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Floor on effective iterations, so tiny requests still estimate.
    pub min_iterations: u64,

    /// Ceiling on effective iterations.
    pub max_iterations: u64,

    /// Ceiling applied instead of `max_iterations` in quick mode.
    pub quick_max_iterations: u64,

    /// Per-player growth above two players: each extra active player
    /// multiplies the budget by (1 + this), up to the ceiling. More
    /// players means more variance to average out.
    pub per_player_growth: f64,

    /// Per-known-board-card discount: each already-dealt community card
    /// multiplies the budget by (1 - this). Fewer unknowns, lower
    /// variance, fewer trials needed.
    pub per_known_card_discount: f64,

    /// Jobs at or below this many iterations run on a single worker,
    /// where parallel-dispatch overhead would dominate.
    pub small_job_threshold: u64,

    /// Hard cap on workers regardless of core count.
    pub max_workers: usize,

    /// Chunks dispatched per worker, to keep the pool fed evenly.
    pub chunks_per_worker: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            min_iterations: 100,
            max_iterations: 2_000_000,
            quick_max_iterations: 10_000,
            per_player_growth: 0.15,
            per_known_card_discount: 0.06,
            small_job_threshold: 2_000,
            max_workers: 8,
            chunks_per_worker: 4,
        }
    }
}

/// The planner's typed decision, decoupled from how it is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadPlan {
    pub iterations: u64,
    pub workers: usize,
    pub chunk_size: u64,
}

/// Decides the effective trial budget and pool size for a request.
///
/// Inputs: the caller's requested count, how many unfolded hands are in
/// play, how many community cards are already fixed, and the quick-mode
/// flag. Pure policy, no dispatch.
pub fn plan(
    config: &PlannerConfig,
    requested: u64,
    active_players: usize,
    known_board_cards: usize,
    quick: bool,
) -> WorkloadPlan {
    let player_scale = (1.0 + config.per_player_growth)
        .powi(active_players.saturating_sub(2) as i32);
    let board_scale = (1.0 - config.per_known_card_discount).powi(known_board_cards as i32);

    let ceiling = if quick {
        config.quick_max_iterations.min(config.max_iterations)
    } else {
        config.max_iterations
    };
    let scaled = (requested as f64 * player_scale * board_scale).round() as u64;
    let iterations = scaled.clamp(config.min_iterations, ceiling);

    let workers = if iterations <= config.small_job_threshold {
        1
    } else {
        num_cpus::get().min(config.max_workers).max(1)
    };

    let chunks = (workers as u64 * config.chunks_per_worker).max(1);
    let chunk_size = iterations.div_ceil(chunks);

    let plan = WorkloadPlan {
        iterations,
        workers,
        chunk_size,
    };
    log::debug!(
        "planned workload: requested={} active={} known_cards={} quick={} -> {:?}",
        requested,
        active_players,
        known_board_cards,
        quick,
        plan
    );
    plan
}
