use std::fmt;

use itertools::Itertools;

use crate::cards::Card;
use crate::error::{PloError, PloResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandCategory::HighCard => write!(f, "High Card"),
            HandCategory::OnePair => write!(f, "One Pair"),
            HandCategory::TwoPair => write!(f, "Two Pair"),
            HandCategory::ThreeOfAKind => write!(f, "Three of a Kind"),
            HandCategory::Straight => write!(f, "Straight"),
            HandCategory::Flush => write!(f, "Flush"),
            HandCategory::FullHouse => write!(f, "Full House"),
            HandCategory::FourOfAKind => write!(f, "Four of a Kind"),
            HandCategory::StraightFlush => write!(f, "Straight Flush"),
            HandCategory::RoyalFlush => write!(f, "Royal Flush"),
        }
    }
}

/// Total-ordered strength of one 5-card hand: category first, then kicker
/// vector. Kicker vectors are the same length within a category, so the
/// derived lexicographic comparison is the standard poker tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandScore {
    pub category: HandCategory,
    pub kickers: Vec<u8>,
}

impl HandScore {
    fn new(category: HandCategory, kickers: Vec<u8>) -> Self {
        HandScore { category, kickers }
    }
}

impl fmt::Display for HandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

fn is_flush(cards: &[Card; 5]) -> bool {
    cards.windows(2).all(|w| w[0].suit == w[1].suit)
}

fn straight_high(values: &[u8]) -> Option<u8> {
    let unique: std::collections::BTreeSet<u8> = values.iter().copied().collect();
    if unique.len() < 5 {
        return None;
    }
    let sorted: Vec<u8> = unique.into_iter().rev().collect();
    if sorted[0] - sorted[4] == 4 {
        return Some(sorted[0]);
    }
    // Wheel: A-2-3-4-5
    if sorted == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

pub fn evaluate_five(cards: &[Card; 5]) -> HandScore {
    let mut values: Vec<u8> = cards.iter().map(|c| c.value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let flush = is_flush(cards);
    let straight = straight_high(&values);

    if flush {
        if let Some(high) = straight {
            if high == 14 {
                return HandScore::new(HandCategory::RoyalFlush, vec![14]);
            }
            return HandScore::new(HandCategory::StraightFlush, vec![high]);
        }
    }

    let mut counts = [0u8; 15];
    for &v in &values {
        counts[v as usize] += 1;
    }

    // (count, value) sorted by count desc, then value desc
    let mut freq: Vec<(u8, u8)> = (2..=14u8)
        .filter(|&v| counts[v as usize] > 0)
        .map(|v| (counts[v as usize], v))
        .collect();
    freq.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    if freq[0].0 == 4 {
        let quad = freq[0].1;
        let kicker = values.iter().copied().find(|&v| v != quad).unwrap_or(0);
        return HandScore::new(HandCategory::FourOfAKind, vec![quad, kicker]);
    }

    if freq[0].0 == 3 && freq[1].0 == 2 {
        return HandScore::new(HandCategory::FullHouse, vec![freq[0].1, freq[1].1]);
    }

    if flush {
        return HandScore::new(HandCategory::Flush, values);
    }

    if let Some(high) = straight {
        return HandScore::new(HandCategory::Straight, vec![high]);
    }

    if freq[0].0 == 3 {
        let trips = freq[0].1;
        let mut kickers = vec![trips];
        kickers.extend(values.iter().copied().filter(|&v| v != trips));
        return HandScore::new(HandCategory::ThreeOfAKind, kickers);
    }

    let pairs: Vec<u8> = freq.iter().filter(|&&(n, _)| n == 2).map(|&(_, v)| v).collect();

    if pairs.len() == 2 {
        let kicker = values
            .iter()
            .copied()
            .find(|v| !pairs.contains(v))
            .unwrap_or(0);
        return HandScore::new(HandCategory::TwoPair, vec![pairs[0], pairs[1], kicker]);
    }

    if pairs.len() == 1 {
        let pair = pairs[0];
        let mut kickers = vec![pair];
        kickers.extend(values.iter().copied().filter(|&v| v != pair));
        return HandScore::new(HandCategory::OnePair, kickers);
    }

    HandScore::new(HandCategory::HighCard, values)
}

/// Best PLO score for a 4-card hole hand on a fully resolved 5-card board.
///
/// Omaha rule: exactly 2 hole cards combined with exactly 3 board cards.
/// Enumerates all C(4,2) x C(5,3) = 60 two-plus-three combinations and
/// returns the maximum. This is the hot loop the eval cache fronts.
pub fn evaluate_omaha(hole: &[Card], board: &[Card]) -> PloResult<HandScore> {
    if hole.len() != 4 {
        return Err(PloError::InvalidHandShape(format!(
            "hole hand has {} cards, PLO requires exactly 4",
            hole.len()
        )));
    }
    if board.len() != 5 {
        return Err(PloError::InvalidHandShape(format!(
            "board has {} cards, evaluation requires exactly 5",
            board.len()
        )));
    }

    let mut best: Option<HandScore> = None;
    for pair in hole.iter().combinations(2) {
        for triple in board.iter().combinations(3) {
            let five: [Card; 5] = [*pair[0], *pair[1], *triple[0], *triple[1], *triple[2]];
            let score = evaluate_five(&five);
            if best.as_ref().map_or(true, |b| score > *b) {
                best = Some(score);
            }
        }
    }
    // 60 combinations were just scored, best is always set
    Ok(best.unwrap())
}

pub fn compare_omaha(hole1: &[Card], hole2: &[Card], board: &[Card]) -> PloResult<std::cmp::Ordering> {
    let s1 = evaluate_omaha(hole1, board)?;
    let s2 = evaluate_omaha(hole2, board)?;
    Ok(s1.cmp(&s2))
}
