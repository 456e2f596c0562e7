//! WebSocket protocol messages for the Hokm server.
//!
//! The acting player is always the connection itself, so client messages carry
//! no player id. Everything else maps one-to-one onto an engine [`Command`].

use hokm_core::{
    Card, Command, GameError, GameEvent, Mode, PlayerId, SessionId, SessionSnapshot, Suit,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Open a new table
    CreateSession { mode: Mode, display_name: String },

    /// Sit down at an open table
    JoinSession { session_id: SessionId, display_name: String },

    /// Declare trump (hakem only)
    ChooseTrump { session_id: SessionId, suit: Suit },

    /// Play a card
    PlayCard { session_id: SessionId, card: Card },

    /// Ask for your own hand
    ShowHand { session_id: SessionId },

    /// Cancel a table you created
    CancelSession { session_id: SessionId },

    /// Request the list of open tables
    ListLobbies,

    /// Ping for keepalive
    Ping,
}

impl ClientMessage {
    /// The engine command for this message, if it is one
    pub fn into_command(self, player: PlayerId) -> Option<Command> {
        let command = match self {
            ClientMessage::CreateSession { mode, display_name } => Command::CreateSession {
                mode,
                creator: player,
                display_name,
            },
            ClientMessage::JoinSession {
                session_id,
                display_name,
            } => Command::JoinSession {
                session: session_id,
                player,
                display_name,
            },
            ClientMessage::ChooseTrump { session_id, suit } => Command::ChooseTrump {
                session: session_id,
                player,
                suit,
            },
            ClientMessage::PlayCard { session_id, card } => Command::PlayCard {
                session: session_id,
                player,
                card,
            },
            ClientMessage::ShowHand { session_id } => Command::ShowHand {
                session: session_id,
                player,
            },
            ClientMessage::CancelSession { session_id } => Command::CancelSession {
                session: session_id,
                player,
                moderator: false,
            },
            ClientMessage::ListLobbies | ClientMessage::Ping => return None,
        };
        Some(command)
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned player ID
    Welcome { player_id: Uuid },

    /// Table created; sent to the creator only
    SessionCreated {
        session_id: SessionId,
        snapshot: SessionSnapshot,
    },

    /// Table changed; sent to everyone seated
    SessionUpdated {
        snapshot: SessionSnapshot,
        events: Vec<GameEvent>,
    },

    /// Your hand; never broadcast
    Hand { session_id: SessionId, cards: Vec<Card> },

    /// Table discarded
    SessionCancelled {
        session_id: SessionId,
        events: Vec<GameEvent>,
    },

    /// Open tables
    LobbyList { lobbies: Vec<SessionSnapshot> },

    /// The last message was rejected
    Error {
        error: Option<GameError>,
        message: String,
    },

    /// Pong response
    Pong,
}

impl From<GameError> for ServerMessage {
    fn from(error: GameError) -> Self {
        ServerMessage::Error {
            message: error.to_string(),
            error: Some(error),
        }
    }
}
