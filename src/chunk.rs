use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cards::Card;
use crate::error::PloResult;
use crate::eval_cache::EvalCache;
use crate::hand_evaluator::HandScore;
use crate::request::{SimulationRequest, BOARD_SIZE};
use crate::sampler::BoardSampler;

/// One unit of dispatched work: how many trials, seeded how.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSpec {
    pub trials: u64,
    pub seed: u64,
}

/// Per-player running tallies for a batch of trials. Purely additive, so
/// chunk accumulators can be computed independently and summed in any
/// order.
///
/// Pot-splitting convention (double board): each board carries exactly
/// half the pot and a board's half splits evenly among that board's
/// winner set, so a player's per-trial share is
/// sum over boards of (member ? 1/|winners| : 0) divided by the board
/// count. This is the standard convention; confirm against reference
/// outputs before treating the exact weighting as load-bearing.
#[derive(Debug, Clone)]
pub struct EquityAccumulator {
    pub trials: u64,
    /// Trials where the player took the entire pot alone.
    pub wins: Vec<u64>,
    /// Summed pot shares from trials the player split.
    pub split_equity: Vec<f64>,
    /// Double-board trials where the player won or shared both boards.
    pub scoops: Vec<u64>,
}

impl EquityAccumulator {
    pub fn new(players: usize) -> Self {
        EquityAccumulator {
            trials: 0,
            wins: vec![0; players],
            split_equity: vec![0.0; players],
            scoops: vec![0; players],
        }
    }

    pub fn merge(&mut self, other: &EquityAccumulator) {
        self.trials += other.trials;
        for i in 0..self.wins.len() {
            self.wins[i] += other.wins[i];
            self.split_equity[i] += other.split_equity[i];
            self.scoops[i] += other.scoops[i];
        }
    }

    /// Total pot share captured by a player, in trials.
    pub fn equity_sum(&self, player: usize) -> f64 {
        self.wins[player] as f64 + self.split_equity[player]
    }
}

/// The set of players holding the best score on one resolved board.
fn winner_set(
    request: &SimulationRequest,
    active: &[usize],
    board: &[Card; BOARD_SIZE],
    cache: &mut EvalCache,
) -> PloResult<Vec<usize>> {
    let mut best: Option<HandScore> = None;
    let mut winners: Vec<usize> = Vec::with_capacity(active.len());
    for &i in active {
        let score = cache.score(&request.hands[i].cards, board)?;
        match &best {
            None => {
                best = Some(score);
                winners.push(i);
            }
            Some(b) => match score.cmp(b) {
                Ordering::Greater => {
                    best = Some(score);
                    winners.clear();
                    winners.push(i);
                }
                Ordering::Equal => winners.push(i),
                Ordering::Less => {}
            },
        }
    }
    Ok(winners)
}

/// Scores one fully-resolved trial and folds it into the accumulator.
///
/// Also the workhorse of the early-termination path, which is just a
/// single deterministic trial with zero sampled cards.
pub fn record_trial(
    acc: &mut EquityAccumulator,
    request: &SimulationRequest,
    active: &[usize],
    boards: &[[Card; BOARD_SIZE]],
    cache: &mut EvalCache,
) -> PloResult<()> {
    let players = request.hands.len();
    let mut shares = vec![0.0f64; players];
    let mut boards_won = vec![0usize; players];

    for board in boards {
        let winners = winner_set(request, active, board, cache)?;
        let share = 1.0 / winners.len() as f64;
        for &i in &winners {
            shares[i] += share;
            boards_won[i] += 1;
        }
    }

    let n_boards = boards.len();
    for i in 0..players {
        let share = shares[i] / n_boards as f64;
        if share == 1.0 {
            acc.wins[i] += 1;
        } else if share > 0.0 {
            acc.split_equity[i] += share;
        }
        if n_boards == 2 && boards_won[i] == 2 {
            acc.scoops[i] += 1;
        }
    }
    acc.trials += 1;
    Ok(())
}

/// Runs one chunk of sampled trials with its own RNG and its own eval
/// cache; nothing here is shared with other workers.
pub fn run_chunk(
    request: &SimulationRequest,
    sampler: &BoardSampler,
    spec: ChunkSpec,
) -> PloResult<EquityAccumulator> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let mut cache = EvalCache::new();
    let active: Vec<usize> = request
        .hands
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.folded)
        .map(|(i, _)| i)
        .collect();

    let mut acc = EquityAccumulator::new(request.hands.len());
    for _ in 0..spec.trials {
        let boards = sampler.complete_boards(&mut rng);
        record_trial(&mut acc, request, &active, &boards, &mut cache)?;
    }

    log::trace!(
        "chunk done: {} trials, cache {} entries ({} hits / {} misses)",
        spec.trials,
        cache.len(),
        cache.hits(),
        cache.misses()
    );
    Ok(acc)
}
