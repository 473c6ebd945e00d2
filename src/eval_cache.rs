use std::collections::HashMap;

use crate::cards::Card;
use crate::error::PloResult;
use crate::hand_evaluator::{evaluate_omaha, HandScore};

/// Canonical cache address: hole and board sorted by the total card order,
/// so every permutation of the same cards hits the same entry.
pub type EvalKey = ([Card; 4], [Card; 5]);

pub fn eval_key(hole: &[Card; 4], board: &[Card; 5]) -> EvalKey {
    let mut h = *hole;
    let mut b = *board;
    h.sort_unstable();
    b.sort_unstable();
    (h, b)
}

/// Memoizes `evaluate_omaha` results for the lifetime of one request.
///
/// Each worker chunk owns its own instance; nothing is shared across
/// threads, so lookups stay lock-free. Evaluation is a pure function of
/// the key, which is what makes additive, never-invalidated caching sound.
pub struct EvalCache {
    entries: HashMap<EvalKey, HandScore>,
    hits: u64,
    misses: u64,
}

impl EvalCache {
    pub fn new() -> Self {
        EvalCache {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the stored score on a hit; evaluates, stores, and returns
    /// it on a miss.
    pub fn score(&mut self, hole: &[Card; 4], board: &[Card; 5]) -> PloResult<HandScore> {
        let key = eval_key(hole, board);
        if let Some(score) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(score.clone());
        }
        let score = evaluate_omaha(hole, board)?;
        self.entries.insert(key, score.clone());
        self.misses += 1;
        Ok(score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for EvalCache {
    fn default() -> Self {
        Self::new()
    }
}
