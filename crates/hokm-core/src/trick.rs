//! Trick evaluation: card strength, trick winner and the follow-suit rule.

use crate::card::{Card, Suit};
use crate::error::IllegalCardReason;
use crate::hand::Hand;
use crate::player::Seat;
use serde::{Deserialize, Serialize};

/// Bonus that puts every trump card above every non-trump card
const TRUMP_BONUS: u16 = 200;

/// Bonus that puts led-suit cards above off-suit discards
const LED_BONUS: u16 = 100;

/// One card played into a trick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

impl Play {
    pub fn new(seat: Seat, card: Card) -> Self {
        Self { seat, card }
    }
}

/// The suit of the first card in the trick
pub fn led_suit(trick: &[Play]) -> Option<Suit> {
    trick.first().map(|p| p.card.suit)
}

/// Strength of a card within a trick.
///
/// Trump cards score rank + 200, cards of the led suit rank + 100 and
/// discards their bare rank, so the ordering is total across all cards that
/// can meet in one trick.
pub fn card_rank(card: Card, trump: Suit, led: Suit) -> u16 {
    let base = card.rank as u16;
    if card.suit == trump {
        base + TRUMP_BONUS
    } else if card.suit == led {
        base + LED_BONUS
    } else {
        base
    }
}

/// The winning play of a trick, or `None` for an empty trick
pub fn resolve_trick(trick: &[Play], trump: Suit) -> Option<Play> {
    let led = led_suit(trick)?;
    trick
        .iter()
        .copied()
        .max_by_key(|p| card_rank(p.card, trump, led))
}

/// Check whether `card` may be played from `hand` onto `trick`.
///
/// Leading allows any held card. Otherwise a player holding the led suit must
/// play it.
pub fn is_legal_play(hand: &Hand, card: Card, trick: &[Play]) -> Result<(), IllegalCardReason> {
    if !hand.contains(card) {
        return Err(IllegalCardReason::NotInHand);
    }

    match led_suit(trick) {
        Some(led) if card.suit != led && hand.has_suit(led) => {
            Err(IllegalCardReason::MustFollowSuit { led })
        }
        _ => Ok(()),
    }
}

/// Every card in `hand` that may legally be played onto `trick`
pub fn legal_cards(hand: &Hand, trick: &[Play]) -> Vec<Card> {
    hand.sorted()
        .into_iter()
        .filter(|&card| is_legal_play(hand, card, trick).is_ok())
        .collect()
}
