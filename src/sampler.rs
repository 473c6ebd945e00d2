use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::{remaining_deck, Card};
use crate::error::{PloError, PloResult};
use crate::request::{SimulationRequest, BOARD_SIZE};

/// Completes partially dealt boards from the request's live deck.
///
/// Both boards of a double-board pot are filled from one shuffled draw of
/// the same physical deck, so a card landing on the top board can never
/// reappear on the bottom board within a trial. The partial shuffle is a
/// uniform Fisher-Yates prefix: every unseen card is equally likely to
/// land in each open slot.
pub struct BoardSampler {
    deck: Vec<Card>,
    prefixes: Vec<Vec<Card>>,
    total_needed: usize,
}

impl BoardSampler {
    pub fn new(request: &SimulationRequest) -> PloResult<Self> {
        let deck = remaining_deck(&request.committed_cards());
        let total_needed = request.unknown_slots();
        if total_needed > deck.len() {
            return Err(PloError::InsufficientDeck {
                needed: total_needed,
                available: deck.len(),
            });
        }
        Ok(BoardSampler {
            deck,
            prefixes: request.boards.clone(),
            total_needed,
        })
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Draws one trial's run-outs: every board resolved to exactly 5 cards.
    pub fn complete_boards<R: Rng>(&self, rng: &mut R) -> Vec<[Card; BOARD_SIZE]> {
        let mut deck = self.deck.clone();
        let (drawn, _) = deck.partial_shuffle(rng, self.total_needed);

        let mut boards = Vec::with_capacity(self.prefixes.len());
        let mut offset = 0;
        for prefix in &self.prefixes {
            let need = BOARD_SIZE - prefix.len();
            let mut filled = prefix.clone();
            filled.extend_from_slice(&drawn[offset..offset + need]);
            offset += need;
            boards.push([filled[0], filled[1], filled[2], filled[3], filled[4]]);
        }
        boards
    }
}
