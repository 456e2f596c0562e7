//! Commands the adapter can send and the events they produce.
//!
//! A command is parsed once at the adapter boundary into one of the typed
//! variants below. Every successful command returns the events describing what
//! changed, in the order it happened.

use crate::card::{Card, Suit};
use crate::player::{Mode, PlayerId, Seat, Side, SideScore};
use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// All actions an adapter can submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    /// Open a new lobby with the creator in seat 0
    CreateSession {
        mode: Mode,
        creator: PlayerId,
        display_name: String,
    },
    /// Take the next free seat
    JoinSession {
        session: SessionId,
        player: PlayerId,
        display_name: String,
    },
    /// Declare the trump suit (hakem only)
    ChooseTrump {
        session: SessionId,
        player: PlayerId,
        suit: Suit,
    },
    /// Play a card into the current trick
    PlayCard {
        session: SessionId,
        player: PlayerId,
        card: Card,
    },
    /// Ask for your own hand
    ShowHand {
        session: SessionId,
        player: PlayerId,
    },
    /// Discard the session (creator, or a moderator vouched for by the adapter)
    CancelSession {
        session: SessionId,
        player: PlayerId,
        #[serde(default)]
        moderator: bool,
    },
}

impl Command {
    /// The acting player
    pub fn player(&self) -> &PlayerId {
        match self {
            Command::CreateSession { creator, .. } => creator,
            Command::JoinSession { player, .. }
            | Command::ChooseTrump { player, .. }
            | Command::PlayCard { player, .. }
            | Command::ShowHand { player, .. }
            | Command::CancelSession { player, .. } => player,
        }
    }

    /// The target session, if the command addresses one
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Command::CreateSession { .. } => None,
            Command::JoinSession { session, .. }
            | Command::ChooseTrump { session, .. }
            | Command::PlayCard { session, .. }
            | Command::ShowHand { session, .. }
            | Command::CancelSession { session, .. } => Some(*session),
        }
    }
}

/// Events that occur as a result of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A player took a seat
    PlayerJoined { player: PlayerId, seat: Seat },

    /// Five cards each were dealt and the hakem is waiting to pick trump
    RoundStarted { round: u32, hakem: Seat },

    /// Trump was declared and the rest of the cards dealt
    TrumpChosen { hakem: Seat, suit: Suit },

    /// A card went into the trick
    CardPlayed { seat: Seat, card: Card },

    /// A full trick was resolved
    TrickWon {
        seat: Seat,
        side: Side,
        /// The side's trick count for this round
        tricks: u8,
    },

    /// A side reached the trick target
    RoundWon {
        round: u32,
        side: Side,
        match_score: SideScore,
    },

    /// A side reached the round target; the session is over
    MatchWon { side: Side, match_score: SideScore },

    /// The session was discarded
    SessionCancelled { by: PlayerId },
}
