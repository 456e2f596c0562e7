//! Engine error kinds.
//!
//! All of these are rejections of a single action. None of them is fatal, and
//! a rejected action never changes the session it was aimed at.

use crate::card::Suit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a card cannot be played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IllegalCardReason {
    #[error("card is not in your hand")]
    NotInHand,

    #[error("must follow suit ({led})")]
    MustFollowSuit { led: Suit },
}

/// Errors returned by the dispatcher and the state machine
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum GameError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Session id is already in use")]
    DuplicateSessionId,

    #[error("Session is full")]
    SessionFull,

    #[error("Already joined this session")]
    AlreadyJoined,

    #[error("Not a player in this session")]
    NotInSession,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Only the hakem can choose the trump suit")]
    NotHakem,

    #[error("Illegal card: {0}")]
    IllegalCard(IllegalCardReason),

    #[error("Action not allowed in the current state")]
    InvalidState,

    #[error("Only the session creator or a moderator can do that")]
    NotAuthorized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GameError::IllegalCard(IllegalCardReason::MustFollowSuit { led: Suit::Hearts });
        assert_eq!(err.to_string(), "Illegal card: must follow suit (♥)");
        assert_eq!(GameError::NotHakem.to_string(), "Only the hakem can choose the trump suit");
    }

    #[test]
    fn test_error_serializes_with_kind() {
        let json = serde_json::to_value(GameError::SessionFull).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "SessionFull" }));
    }
}
