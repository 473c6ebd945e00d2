use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{PloError, PloResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub fn from_char(c: char) -> PloResult<Rank> {
        match c {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(PloError::InvalidRank(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub fn from_char(c: char) -> PloResult<Suit> {
        match c.to_ascii_lowercase() {
            's' => Ok(Suit::Spades),
            'h' => Ok(Suit::Hearts),
            'd' => Ok(Suit::Diamonds),
            'c' => Ok(Suit::Clubs),
            _ => Err(PloError::InvalidSuit(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "\u{2660}",
            Suit::Hearts => "\u{2665}",
            Suit::Diamonds => "\u{2666}",
            Suit::Clubs => "\u{2663}",
        }
    }
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

/// One of the 52 cards. The derived `Ord` compares rank first, then suit,
/// which makes sorted card tuples canonical (required by the eval cache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    /// Canonical 0..52 index: rank-major, suit-minor.
    pub fn index(&self) -> u8 {
        let r = self.rank.value() - 2;
        let s = match self.suit {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Diamonds => 2,
            Suit::Clubs => 3,
        };
        r * 4 + s
    }

    pub fn from_index(idx: u8) -> PloResult<Card> {
        if idx >= 52 {
            return Err(PloError::InvalidCardIndex(idx));
        }
        let rank = ALL_RANKS[(idx / 4) as usize];
        let suit = ALL_SUITS[(idx % 4) as usize];
        Ok(Card::new(rank, suit))
    }

    pub fn pretty(&self) -> String {
        format!("{}{}", self.rank.to_char(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

/// All 52 cards, rank-major order.
pub static FULL_DECK: Lazy<Vec<Card>> = Lazy::new(|| {
    ALL_RANKS
        .iter()
        .flat_map(|&r| ALL_SUITS.iter().map(move |&s| Card::new(r, s)))
        .collect()
});

/// The 52-card universe minus every card committed elsewhere in the request.
pub fn remaining_deck(committed: &[Card]) -> Vec<Card> {
    let committed: std::collections::HashSet<Card> = committed.iter().copied().collect();
    FULL_DECK
        .iter()
        .copied()
        .filter(|c| !committed.contains(c))
        .collect()
}

pub fn parse_card(notation: &str) -> PloResult<Card> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();
    if chars.len() != 2 {
        return Err(PloError::InvalidCardNotation(notation.to_string()));
    }
    let rank = Rank::from_char(chars[0].to_ascii_uppercase())?;
    let suit = Suit::from_char(chars[1])?;
    Ok(Card::new(rank, suit))
}

/// Parses a run of 2-char cards, tolerant of spaces and commas: "As Kd,Qh".
pub fn parse_cards(notation: &str) -> PloResult<Vec<Card>> {
    let cleaned = notation.trim().replace(' ', "").replace(',', "");
    if cleaned.len() % 2 != 0 {
        return Err(PloError::InvalidBoardNotation(notation.to_string()));
    }
    let mut cards = Vec::new();
    let chars: Vec<char> = cleaned.chars().collect();
    for i in (0..chars.len()).step_by(2) {
        let s: String = chars[i..i + 2].iter().collect();
        cards.push(parse_card(&s)?);
    }
    Ok(cards)
}

/// Parses a board: 0 to 5 cards.
pub fn parse_board(notation: &str) -> PloResult<Vec<Card>> {
    let cards = parse_cards(notation)?;
    if cards.len() > 5 {
        return Err(PloError::InvalidBoardNotation(notation.to_string()));
    }
    Ok(cards)
}

/// Parses a PLO hole hand: exactly 4 distinct cards.
pub fn parse_hand(notation: &str) -> PloResult<[Card; 4]> {
    let cards = parse_cards(notation)?;
    if cards.len() != 4 {
        return Err(PloError::InvalidHandShape(format!(
            "hand '{}' has {} cards, PLO hands have exactly 4",
            notation.trim(),
            cards.len()
        )));
    }
    for i in 0..4 {
        for j in (i + 1)..4 {
            if cards[i] == cards[j] {
                return Err(PloError::DuplicateCard(cards[i]));
            }
        }
    }
    Ok([cards[0], cards[1], cards[2], cards[3]])
}

pub fn cards_to_string(cards: &[Card]) -> String {
    cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("")
}
