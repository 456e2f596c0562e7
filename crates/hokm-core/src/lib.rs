//! Hokm - a trick-taking card game engine
//!
//! This crate provides the game logic for Hokm in its 2-player and
//! 4-player (fixed partnership) forms:
//! - Cards, deck and hands
//! - Trick evaluation with trump and the follow-suit rule
//! - Round state machine: dealing, trump choice, trick play
//! - Match scoring and hakem rotation
//! - A session registry that routes typed commands from an adapter
//!
//! # Architecture
//!
//! The engine performs no I/O. An adapter (chat bot, WebSocket server, ...)
//! turns user input into [`Command`]s, hands them to the [`Dispatcher`], and
//! renders the returned [`SessionSnapshot`] and [`GameEvent`]s. Every
//! transition completes synchronously before the snapshot is produced.
//!
//! # Modules
//!
//! - [`card`]: suits, cards and the deck
//! - [`hand`]: cards held by a seat
//! - [`trick`]: card strength, trick winner, legality
//! - [`round`]: one round from dealing to the seventh trick
//! - [`session`]: a match from lobby to the seventh round
//! - [`dispatcher`]: session registry and command routing
//! - [`bot`]: computer players

pub mod actions;
pub mod bot;
pub mod card;
pub mod dispatcher;
pub mod error;
pub mod hand;
pub mod player;
pub mod round;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod trick;

// Re-export commonly used types
pub use actions::{Command, GameEvent};
pub use bot::{Bot, BotDifficulty, BotMove};
pub use card::{Card, Deck, Suit, ACE, DECK_SIZE, JACK, KING, QUEEN};
pub use dispatcher::{
    ActionResult, DealSource, Dispatcher, Response, Seeding, SequentialIds, SessionIds,
};
pub use error::{GameError, IllegalCardReason};
pub use hand::Hand;
pub use player::{Mode, Player, PlayerId, Seat, Side, SideScore};
pub use round::{HakemChoice, Round, RoundPhase};
pub use rules::{HakemRotation, MatchRules, RulesError};
pub use session::{Session, SessionId, SessionStatus};
pub use snapshot::{PlayView, SeatView, SessionSnapshot, TrickView};
pub use trick::{card_rank, is_legal_play, legal_cards, resolve_trick, Play};
