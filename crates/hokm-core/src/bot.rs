//! Computer players.
//!
//! A bot sees exactly what a human at the table sees: the public snapshot and
//! its own hand. Two difficulty levels:
//! - Easy: random legal moves
//! - Medium: longest suit as trump, wins tricks as cheaply as it can

use crate::actions::Command;
use crate::card::{Card, Suit};
use crate::hand::Hand;
use crate::player::PlayerId;
use crate::session::{SessionId, SessionStatus};
use crate::snapshot::SessionSnapshot;
use crate::trick::{self, card_rank, Play};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
}

/// A move a bot decided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMove {
    ChooseTrump(Suit),
    PlayCard(Card),
}

impl BotMove {
    pub fn into_command(self, session: SessionId, player: PlayerId) -> Command {
        match self {
            BotMove::ChooseTrump(suit) => Command::ChooseTrump {
                session,
                player,
                suit,
            },
            BotMove::PlayCard(card) => Command::PlayCard {
                session,
                player,
                card,
            },
        }
    }
}

/// A bot player that can decide on moves
pub struct Bot {
    pub player: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(player: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decide what to do, or `None` when it is not this bot's turn
    pub fn choose_move(&mut self, snapshot: &SessionSnapshot, hand: &[Card]) -> Option<BotMove> {
        if snapshot.turn_player() != Some(&self.player) || hand.is_empty() {
            return None;
        }

        match snapshot.status {
            SessionStatus::ChoosingTrump => Some(BotMove::ChooseTrump(self.choose_trump(hand))),
            SessionStatus::Playing => self.choose_card(snapshot, hand).map(BotMove::PlayCard),
            SessionStatus::Lobby | SessionStatus::Finished { .. } => None,
        }
    }

    fn choose_trump(&mut self, hand: &[Card]) -> Suit {
        match self.difficulty {
            BotDifficulty::Easy => hand
                .choose(&mut self.rng)
                .map(|c| c.suit)
                .unwrap_or(Suit::Spades),
            // Longest suit, ties broken by total rank
            BotDifficulty::Medium => Suit::ALL
                .into_iter()
                .max_by_key(|&suit| {
                    let cards = hand.iter().filter(|c| c.suit == suit);
                    let strength: u32 = cards.clone().map(|c| c.rank as u32).sum();
                    (cards.count(), strength)
                })
                .unwrap_or(Suit::Spades),
        }
    }

    fn choose_card(&mut self, snapshot: &SessionSnapshot, hand: &[Card]) -> Option<Card> {
        let trick = snapshot.trick_plays();
        let legal = trick::legal_cards(&Hand::from_cards(hand.to_vec()), &trick);

        match self.difficulty {
            BotDifficulty::Easy => legal.choose(&mut self.rng).copied(),
            BotDifficulty::Medium => {
                let trump = snapshot.trump?;
                medium_card(snapshot, &legal, &trick, trump)
            }
        }
    }
}

fn medium_card(
    snapshot: &SessionSnapshot,
    legal: &[Card],
    trick: &[Play],
    trump: Suit,
) -> Option<Card> {
    let Some(led) = trick::led_suit(trick) else {
        // Leading: highest card, saving trumps when possible
        let non_trump: Vec<Card> = legal.iter().copied().filter(|c| c.suit != trump).collect();
        let pool: &[Card] = if non_trump.is_empty() { legal } else { &non_trump };
        return pool.iter().copied().max_by_key(|c| c.rank);
    };

    let strength = |card: &Card| card_rank(*card, trump, led);
    let lowest = legal.iter().copied().min_by_key(strength);
    let winning = trick::resolve_trick(trick, trump)?;

    // Partner already has it
    let my_side = snapshot
        .seat_of(snapshot.turn_player()?)
        .map(|seat| snapshot.mode.side_of(seat));
    if my_side == Some(snapshot.mode.side_of(winning.seat)) {
        return lowest;
    }

    let to_beat = strength(&winning.card);
    legal
        .iter()
        .copied()
        .filter(|c| strength(c) > to_beat)
        .min_by_key(strength)
        .or(lowest)
}
