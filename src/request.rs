use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::cards::{cards_to_string, Card};
use crate::error::{PloError, PloResult};

/// Hard cap on simultaneous players (bomb pots run up to 8-handed).
pub const MAX_PLAYERS: usize = 8;

/// Cards in one community board when fully dealt.
pub const BOARD_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct PlayerHand {
    pub cards: [Card; 4],
    /// Folded hands are excluded from evaluation but still block their
    /// cards from being sampled.
    pub folded: bool,
}

impl PlayerHand {
    pub fn new(cards: [Card; 4]) -> Self {
        PlayerHand {
            cards,
            folded: false,
        }
    }

    pub fn folded(cards: [Card; 4]) -> Self {
        PlayerHand {
            cards,
            folded: true,
        }
    }
}

/// A complete equity question: who holds what, what is already on the
/// board(s), what is known dead, and how hard to sample.
///
/// Hands, boards, and dead cards are immutable for the lifetime of the
/// request; workers receive read-only snapshots.
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub hands: Vec<PlayerHand>,
    /// One board for a normal pot, two for a double-board bomb pot. Each
    /// may be partially dealt (0-5 cards) and is completed by sampling.
    pub boards: Vec<Vec<Card>>,
    pub dead_cards: Vec<Card>,
    /// Requested trial count; the workload planner derives the effective
    /// count from this.
    pub iterations: u64,
    /// Bias the planner toward fewer iterations for interactive callers.
    pub quick: bool,
}

impl SimulationRequest {
    pub fn single_board(hands: Vec<PlayerHand>, board: Vec<Card>, iterations: u64) -> Self {
        SimulationRequest {
            hands,
            boards: vec![board],
            dead_cards: Vec::new(),
            iterations,
            quick: false,
        }
    }

    pub fn double_board(
        hands: Vec<PlayerHand>,
        top: Vec<Card>,
        bottom: Vec<Card>,
        iterations: u64,
    ) -> Self {
        SimulationRequest {
            hands,
            boards: vec![top, bottom],
            dead_cards: Vec::new(),
            iterations,
            quick: false,
        }
    }

    pub fn is_double_board(&self) -> bool {
        self.boards.len() == 2
    }

    pub fn active_players(&self) -> usize {
        self.hands.iter().filter(|h| !h.folded).count()
    }

    /// Every card already committed to a hand, a board, or the dead set.
    pub fn committed_cards(&self) -> Vec<Card> {
        let mut cards = Vec::new();
        for hand in &self.hands {
            cards.extend_from_slice(&hand.cards);
        }
        for board in &self.boards {
            cards.extend_from_slice(board);
        }
        cards.extend_from_slice(&self.dead_cards);
        cards
    }

    /// Open board slots still to be sampled, across all boards.
    pub fn unknown_slots(&self) -> usize {
        self.boards.iter().map(|b| BOARD_SIZE - b.len()).sum()
    }

    /// Already-dealt community cards, the planner's complexity signal.
    pub fn known_board_cards(&self) -> usize {
        self.boards.iter().map(|b| b.len()).sum()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.unknown_slots() == 0
    }

    /// Fail-fast structural checks, run once before any compute is spent.
    pub fn validate(&self) -> PloResult<()> {
        if self.hands.is_empty() {
            return Err(PloError::InvalidHandShape("no hands in request".to_string()));
        }
        if self.hands.len() > MAX_PLAYERS {
            return Err(PloError::InvalidHandShape(format!(
                "{} hands in request, at most {} supported",
                self.hands.len(),
                MAX_PLAYERS
            )));
        }
        if self.active_players() < 2 {
            return Err(PloError::InvalidValue(
                "need at least 2 unfolded hands to compare".to_string(),
            ));
        }
        if self.boards.is_empty() || self.boards.len() > 2 {
            return Err(PloError::InvalidHandShape(format!(
                "{} boards in request, expected 1 or 2",
                self.boards.len()
            )));
        }
        for board in &self.boards {
            if board.len() > BOARD_SIZE {
                return Err(PloError::InvalidHandShape(format!(
                    "board has {} cards, at most {} allowed",
                    board.len(),
                    BOARD_SIZE
                )));
            }
        }

        let mut seen: HashSet<Card> = HashSet::new();
        for card in self.committed_cards() {
            if !seen.insert(card) {
                return Err(PloError::DuplicateCard(card));
            }
        }

        let available = 52 - seen.len();
        let needed = self.unknown_slots();
        if needed > available {
            return Err(PloError::InsufficientDeck { needed, available });
        }

        Ok(())
    }
}

/// Per-player slice of the final report.
///
/// `win_fraction` counts trials where the player took the entire pot
/// alone. `split_fraction` is the equity captured in shared pots, so
/// that win + split summed across players is exactly 1.0. `scoop_fraction`
/// (double-board only) counts trials where the player won or shared both
/// boards.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerEquity {
    pub hand: String,
    pub folded: bool,
    pub win_fraction: f64,
    pub split_fraction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoop_fraction: Option<f64>,
}

impl PlayerEquity {
    /// Expected fractional share of the pot.
    pub fn equity(&self) -> f64 {
        self.win_fraction + self.split_fraction
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EquityReport {
    pub players: Vec<PlayerEquity>,
    /// Trials actually executed, so callers can gauge estimate precision.
    pub trials: u64,
    pub double_board: bool,
}

impl EquityReport {
    pub fn equity(&self, player: usize) -> f64 {
        self.players[player].equity()
    }
}

impl fmt::Display for EquityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.players.iter().enumerate() {
            if p.folded {
                writeln!(f, "P{}: {} (folded)", i + 1, p.hand)?;
                continue;
            }
            write!(
                f,
                "P{}: {} | Win {:.1}% | Split {:.1}%",
                i + 1,
                p.hand,
                p.win_fraction * 100.0,
                p.split_fraction * 100.0,
            )?;
            if let Some(scoop) = p.scoop_fraction {
                write!(f, " | Scoop {:.1}%", scoop * 100.0)?;
            }
            writeln!(f, " (equity: {:.1}%)", p.equity() * 100.0)?;
        }
        write!(f, "{} trials", self.trials)
    }
}

pub fn hand_notation(cards: &[Card; 4]) -> String {
    cards_to_string(cards)
}
