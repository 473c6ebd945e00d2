use thiserror::Error;

use crate::cards::Card;

#[derive(Error, Debug)]
pub enum PloError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid board notation: {0}")]
    InvalidBoardNotation(String),

    #[error("Invalid card index: {0}")]
    InvalidCardIndex(u8),

    #[error("Invalid hand shape: {0}")]
    InvalidHandShape(String),

    #[error("Duplicate card in request: {0}")]
    DuplicateCard(Card),

    #[error("Deck exhausted: need {needed} cards, only {available} remaining")]
    InsufficientDeck { needed: usize, available: usize },

    #[error("Simulation cancelled after {completed} of {total} trials")]
    Cancelled { completed: u64, total: u64 },

    #[error("Worker failure: {0}")]
    WorkerFailure(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type PloResult<T> = Result<T, PloError>;
