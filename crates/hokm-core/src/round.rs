//! The round state machine.
//!
//! A round runs `Dealing5 -> ChoosingTrump -> Dealing8 -> Playing -> RoundOver`.
//! The two dealing phases are passed through synchronously: a round is only
//! ever observed at rest in `ChoosingTrump`, `Playing` or `RoundOver`.

use crate::actions::GameEvent;
use crate::card::{Card, Deck, Suit};
use crate::error::GameError;
use crate::hand::Hand;
use crate::player::{Mode, Seat, Side, SideScore};
use crate::trick::{self, Play};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cards each seat receives before trump is chosen
pub const FIRST_DEAL: usize = 5;

/// Cards each seat holds once dealing is done
pub const HAND_SIZE: usize = 13;

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Dealing the first five cards to each seat
    Dealing5,
    /// Waiting for the hakem to name trump
    ChoosingTrump,
    /// Dealing the remaining cards
    Dealing8,
    /// Trick play
    Playing,
    /// A side reached the trick target
    RoundOver { winner: Side },
}

/// How the hakem of a new round is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HakemChoice {
    /// First round of a match: whoever was dealt the Ace of Spades, else seat 0
    AceOfSpades,
    /// Carried over from the previous round
    Seat(Seat),
}

/// A resolved trick, kept for display after the table is cleared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTrick {
    pub plays: Vec<Play>,
    pub winner: Seat,
}

/// State of one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Round number within the match (starts at 1)
    pub number: u32,
    pub mode: Mode,
    pub phase: RoundPhase,
    pub hakem: Seat,
    pub trump: Option<Suit>,
    /// Seat expected to act next
    pub turn: Seat,
    /// Plays of the trick in progress
    pub trick: Vec<Play>,
    pub trick_score: SideScore,
    pub last_trick: Option<CompletedTrick>,
    tricks_to_win: u8,
    deck: Deck,
    hands: Vec<Hand>,
    /// Cards of resolved tricks, per side
    won: [Vec<Card>; 2],
}

impl Round {
    /// Shuffle, deal five cards each and wait for the hakem to choose trump
    pub fn deal<R: Rng + ?Sized>(
        number: u32,
        mode: Mode,
        hakem: HakemChoice,
        tricks_to_win: u8,
        rng: &mut R,
    ) -> (Self, Vec<GameEvent>) {
        let mut round = Self {
            number,
            mode,
            phase: RoundPhase::Dealing5,
            hakem: 0,
            trump: None,
            turn: 0,
            trick: Vec::new(),
            trick_score: SideScore::default(),
            last_trick: None,
            tricks_to_win,
            deck: Deck::new_shuffled(rng),
            hands: vec![Hand::new(); mode.capacity()],
            won: [Vec::new(), Vec::new()],
        };

        round.deal_until(FIRST_DEAL);

        round.hakem = match hakem {
            HakemChoice::AceOfSpades => round
                .hands
                .iter()
                .position(|h| h.contains(Card::ACE_OF_SPADES))
                .map(|idx| idx as Seat)
                .unwrap_or(0),
            HakemChoice::Seat(seat) => seat,
        };
        round.turn = round.hakem;
        round.phase = RoundPhase::ChoosingTrump;

        let events = vec![GameEvent::RoundStarted {
            round: number,
            hakem: round.hakem,
        }];
        (round, events)
    }

    /// Deal one card at a time in seat order until every hand holds `target`
    /// cards or the deck runs out
    fn deal_until(&mut self, target: usize) {
        while self.hands.iter().any(|h| h.len() < target) {
            for hand in self.hands.iter_mut().filter(|h| h.len() < target) {
                let Some(card) = self.deck.deal() else {
                    return;
                };
                hand.add(card);
            }
        }
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, RoundPhase::RoundOver { .. })
    }

    /// The side that won, once the round is over
    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            RoundPhase::RoundOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn hand(&self, seat: Seat) -> Option<&Hand> {
        self.hands.get(seat as usize)
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Cards a side has collected from won tricks
    pub fn won_cards(&self, side: Side) -> &[Card] {
        &self.won[side.index()]
    }

    /// Every card the round is tracking, wherever it currently is
    pub fn tracked_cards(&self) -> Vec<Card> {
        self.deck
            .cards()
            .iter()
            .chain(self.hands.iter().flat_map(|h| h.cards()))
            .chain(self.trick.iter().map(|p| &p.card))
            .chain(self.won.iter().flatten())
            .copied()
            .collect()
    }

    /// Legal cards for a seat, empty unless it is that seat's turn to play
    pub fn legal_cards(&self, seat: Seat) -> Vec<Card> {
        if self.phase != RoundPhase::Playing || seat != self.turn {
            return Vec::new();
        }
        self.hand(seat)
            .map(|h| trick::legal_cards(h, &self.trick))
            .unwrap_or_default()
    }

    /// Hakem names trump; the remaining cards are dealt and play begins
    pub fn choose_trump(&mut self, seat: Seat, suit: Suit) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != RoundPhase::ChoosingTrump {
            return Err(GameError::InvalidState);
        }
        if seat != self.hakem {
            return Err(GameError::NotHakem);
        }

        self.trump = Some(suit);
        self.phase = RoundPhase::Dealing8;
        self.deal_until(HAND_SIZE);

        self.phase = RoundPhase::Playing;
        self.turn = self.hakem;

        Ok(vec![GameEvent::TrumpChosen {
            hakem: seat,
            suit,
        }])
    }

    /// Play a card for `seat`. Resolves the trick when it is full.
    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<Vec<GameEvent>, GameError> {
        let trump = match (self.phase, self.trump) {
            (RoundPhase::Playing, Some(trump)) => trump,
            _ => return Err(GameError::InvalidState),
        };
        if seat != self.turn {
            return Err(GameError::NotYourTurn);
        }
        let hand = self
            .hands
            .get_mut(seat as usize)
            .ok_or(GameError::InvalidState)?;
        trick::is_legal_play(hand, card, &self.trick).map_err(GameError::IllegalCard)?;

        hand.remove(card);
        self.trick.push(Play::new(seat, card));
        let mut events = vec![GameEvent::CardPlayed { seat, card }];

        if self.trick.len() < self.player_count() {
            self.turn = self.mode.next_seat(seat);
            return Ok(events);
        }

        if let Some(winning) = trick::resolve_trick(&self.trick, trump) {
            events.push(self.complete_trick(winning.seat));
        }
        Ok(events)
    }

    fn complete_trick(&mut self, winner: Seat) -> GameEvent {
        let side = self.mode.side_of(winner);
        let tricks = self.trick_score.increment(side);

        let plays = std::mem::take(&mut self.trick);
        self.won[side.index()].extend(plays.iter().map(|p| p.card));
        self.last_trick = Some(CompletedTrick { plays, winner });
        self.turn = winner;

        if tricks >= self.tricks_to_win {
            self.phase = RoundPhase::RoundOver { winner: side };
        }

        GameEvent::TrickWon {
            seat: winner,
            side,
            tricks,
        }
    }
}
