//! Cards, suits and the deck.
//!
//! Cards are plain values compared by equality. [`Card`] has no `Ord`: which
//! card is higher depends on the trump and the led suit of a trick (see
//! [`crate::trick::card_rank`]).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cards in a full deck
pub const DECK_SIZE: usize = 52;

pub const JACK: u8 = 11;
pub const QUEEN: u8 = 12;
pub const KING: u8 = 13;
pub const ACE: u8 = 14;

/// Lowest and highest rank values
pub const RANKS: std::ops::RangeInclusive<u8> = 2..=ACE;

/// The four French suits.
///
/// The declaration order is the display order used when a hand is sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(&self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    /// 2-10 for pips, 11 Jack, 12 Queen, 13 King, 14 Ace
    pub rank: u8,
}

impl Card {
    /// The card that decides the first hakem of a match
    pub const ACE_OF_SPADES: Card = Card::new(Suit::Spades, ACE);

    /// Create a card. The rank is not checked; use [`Card::try_new`] for input.
    pub const fn new(suit: Suit, rank: u8) -> Self {
        Self { suit, rank }
    }

    /// Create a card if the rank is in `2..=14`
    pub fn try_new(suit: Suit, rank: u8) -> Option<Self> {
        RANKS.contains(&rank).then_some(Self { suit, rank })
    }

    /// Whether the rank is a real one
    pub fn is_valid(&self) -> bool {
        RANKS.contains(&self.rank)
    }

    fn rank_label(&self) -> String {
        match self.rank {
            JACK => "J".to_string(),
            QUEEN => "Q".to_string(),
            KING => "K".to_string(),
            ACE => "A".to_string(),
            n => n.to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_label(), self.suit)
    }
}

/// The undealt cards of a round. Cards are dealt from the top, one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 52 cards in suit/rank order
    pub fn full() -> Self {
        let cards = Suit::ALL
            .iter()
            .flat_map(|&suit| RANKS.map(move |rank| Card::new(suit, rank)))
            .collect();
        Self { cards }
    }

    /// All 52 cards in a uniformly random order
    pub fn new_shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::full();
        deck.cards.shuffle(rng);
        deck
    }

    /// Take the top card, if any are left
    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
