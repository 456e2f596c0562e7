//! A match between two sides, from lobby to final round.

use crate::actions::GameEvent;
use crate::card::{Card, Suit};
use crate::error::GameError;
use crate::player::{Mode, Player, PlayerId, Seat, Side, SideScore};
use crate::round::{HakemChoice, Round, RoundPhase};
use crate::rules::MatchRules;
use crate::snapshot::SessionSnapshot;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry key of a session, handed out in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Waiting for seats to fill
    Lobby,
    /// The hakem has five cards and must name trump
    ChoosingTrump,
    /// Tricks are being played
    Playing,
    /// A side won the match
    Finished { winner: Side },
}

/// One match
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub mode: Mode,
    pub rules: MatchRules,
    pub creator: PlayerId,
    /// Seated players in seat order
    pub players: Vec<Player>,
    pub match_score: SideScore,
    /// The round in progress; after the last round it stays for the final view
    pub round: Option<Round>,
    winner: Option<Side>,
    rng: StdRng,
}

impl Session {
    /// Open a lobby with the creator in seat 0
    pub fn new(
        id: SessionId,
        mode: Mode,
        rules: MatchRules,
        creator: PlayerId,
        display_name: String,
        rng: StdRng,
    ) -> Self {
        Self {
            id,
            mode,
            rules,
            players: vec![Player::new(creator.clone(), display_name, 0)],
            creator,
            match_score: SideScore::default(),
            round: None,
            winner: None,
            rng,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if let Some(winner) = self.winner {
            return SessionStatus::Finished { winner };
        }
        match self.round.as_ref().map(|r| r.phase) {
            None => SessionStatus::Lobby,
            Some(RoundPhase::Playing) => SessionStatus::Playing,
            Some(_) => SessionStatus::ChoosingTrump,
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.mode.capacity()
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn seat_of(&self, player: &PlayerId) -> Option<Seat> {
        self.players.iter().find(|p| &p.id == player).map(|p| p.seat)
    }

    pub fn player_at(&self, seat: Seat) -> Option<&Player> {
        self.players.get(seat as usize)
    }

    /// Whether `player` may cancel the session
    pub fn can_cancel(&self, player: &PlayerId, moderator: bool) -> bool {
        moderator || &self.creator == player
    }

    fn require_seat(&self, player: &PlayerId) -> Result<Seat, GameError> {
        self.seat_of(player).ok_or(GameError::NotInSession)
    }

    /// Take the next seat. Filling the table deals the first round.
    pub fn join(
        &mut self,
        player: PlayerId,
        display_name: String,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.is_finished() {
            return Err(GameError::InvalidState);
        }
        if self.seat_of(&player).is_some() {
            return Err(GameError::AlreadyJoined);
        }
        if self.is_full() {
            return Err(GameError::SessionFull);
        }

        let seat = self.players.len() as Seat;
        self.players.push(Player::new(player.clone(), display_name, seat));
        let mut events = vec![GameEvent::PlayerJoined { player, seat }];

        if self.is_full() {
            events.extend(self.start_round(HakemChoice::AceOfSpades));
        }
        Ok(events)
    }

    fn start_round(&mut self, hakem: HakemChoice) -> Vec<GameEvent> {
        let number = self.round.as_ref().map_or(1, |r| r.number + 1);
        let (round, events) = Round::deal(
            number,
            self.mode,
            hakem,
            self.rules.tricks_to_win_round,
            &mut self.rng,
        );
        self.round = Some(round);
        events
    }

    pub fn choose_trump(
        &mut self,
        player: &PlayerId,
        suit: Suit,
    ) -> Result<Vec<GameEvent>, GameError> {
        let seat = self.require_seat(player)?;
        if self.is_finished() {
            return Err(GameError::InvalidState);
        }
        let round = self.round.as_mut().ok_or(GameError::InvalidState)?;
        round.choose_trump(seat, suit)
    }

    /// Play a card. Finishing a round scores it and either deals the next
    /// round or ends the match.
    pub fn play_card(
        &mut self,
        player: &PlayerId,
        card: Card,
    ) -> Result<Vec<GameEvent>, GameError> {
        let seat = self.require_seat(player)?;
        if self.is_finished() {
            return Err(GameError::InvalidState);
        }
        let round = self.round.as_mut().ok_or(GameError::InvalidState)?;
        let mut events = round.play_card(seat, card)?;

        if let Some(winner) = round.winner() {
            let (number, hakem) = (round.number, round.hakem);
            events.extend(self.finish_round(number, hakem, winner));
        }
        Ok(events)
    }

    fn finish_round(&mut self, number: u32, hakem: Seat, winner: Side) -> Vec<GameEvent> {
        let rounds_won = self.match_score.increment(winner);
        let mut events = vec![GameEvent::RoundWon {
            round: number,
            side: winner,
            match_score: self.match_score,
        }];

        if rounds_won >= self.rules.rounds_to_win_match {
            self.winner = Some(winner);
            events.push(GameEvent::MatchWon {
                side: winner,
                match_score: self.match_score,
            });
        } else {
            let next = self.rules.next_hakem(self.mode, hakem, winner);
            events.extend(self.start_round(HakemChoice::Seat(next)));
        }
        events
    }

    /// The caller's hand, sorted by suit then rank
    pub fn show_hand(&self, player: &PlayerId) -> Result<Vec<Card>, GameError> {
        let seat = self.require_seat(player)?;
        let round = self.round.as_ref().ok_or(GameError::InvalidState)?;
        let hand = round.hand(seat).ok_or(GameError::InvalidState)?;
        Ok(hand.sorted())
    }

    /// Cards the caller could play right now
    pub fn legal_cards(&self, player: &PlayerId) -> Result<Vec<Card>, GameError> {
        let seat = self.require_seat(player)?;
        let round = self.round.as_ref().ok_or(GameError::InvalidState)?;
        Ok(round.legal_cards(seat))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::of(self)
    }
}
