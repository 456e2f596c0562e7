//! Session registry and command routing.
//!
//! The dispatcher owns every live session. Sessions are independent, so
//! commands for different sessions can run on different threads at once.
//! Commands for the same session are serialized: a mutation holds the
//! registry entry's write guard from validation until the snapshot is taken.
//!
//! Session ids and the random source of each deal come from the host through
//! [`SessionIds`] and [`DealSource`]. [`SequentialIds`] and [`Seeding`] cover
//! the usual cases.

use crate::actions::{Command, GameEvent};
use crate::card::{Card, Suit};
use crate::error::GameError;
use crate::player::{Mode, PlayerId};
use crate::rules::{MatchRules, RulesError};
use crate::session::{Session, SessionId, SessionStatus};
use crate::snapshot::SessionSnapshot;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, debug_span, info, warn};

/// Hands out registry keys for new sessions
pub trait SessionIds: Send + Sync {
    fn next_id(&self) -> SessionId;
}

/// Increasing ids starting at 1
#[derive(Debug, Default)]
pub struct SequentialIds(AtomicU64);

impl SessionIds for SequentialIds {
    fn next_id(&self) -> SessionId {
        SessionId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Supplies the random source a new session shuffles with
pub trait DealSource: Send + Sync {
    fn rng_for(&self, id: SessionId) -> StdRng;
}

/// Built-in deal sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seeding {
    /// Fresh OS entropy for every session
    Entropy,
    /// Reproducible deals seeded with `base + session id`
    Fixed(u64),
}

impl DealSource for Seeding {
    fn rng_for(&self, id: SessionId) -> StdRng {
        match *self {
            Seeding::Entropy => StdRng::from_entropy(),
            Seeding::Fixed(base) => StdRng::seed_from_u64(base.wrapping_add(id.0)),
        }
    }
}

/// Outcome of a state-changing command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub events: Vec<GameEvent>,
    pub snapshot: SessionSnapshot,
}

/// Reply to a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Response {
    Created {
        session: SessionId,
        snapshot: SessionSnapshot,
    },
    Updated(ActionResult),
    Hand {
        session: SessionId,
        cards: Vec<Card>,
    },
    Cancelled {
        session: SessionId,
        events: Vec<GameEvent>,
    },
}

/// Registry of live sessions
pub struct Dispatcher {
    sessions: DashMap<SessionId, Session>,
    rules: MatchRules,
    ids: Box<dyn SessionIds>,
    deals: Box<dyn DealSource>,
}

impl Dispatcher {
    /// Sequential ids and entropy-seeded deals
    pub fn new(rules: MatchRules) -> Result<Self, RulesError> {
        Self::with_sources(rules, SequentialIds::default(), Seeding::Entropy)
    }

    /// Deterministic dealing: each session's shuffles derive from `seed` and
    /// the session id
    pub fn with_seed(rules: MatchRules, seed: u64) -> Result<Self, RulesError> {
        Self::with_sources(rules, SequentialIds::default(), Seeding::Fixed(seed))
    }

    pub fn with_sources(
        rules: MatchRules,
        ids: impl SessionIds + 'static,
        deals: impl DealSource + 'static,
    ) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self {
            sessions: DashMap::new(),
            rules,
            ids: Box::new(ids),
            deals: Box::new(deals),
        })
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Route a command to the matching operation
    pub fn dispatch(&self, command: Command) -> Result<Response, GameError> {
        let span = debug_span!(
            "command",
            session = ?command.session(),
            player = %command.player()
        );
        let _enter = span.enter();

        match command {
            Command::CreateSession {
                mode,
                creator,
                display_name,
            } => {
                let session = self.create_session(mode, creator, display_name)?;
                let snapshot = self.snapshot(session)?;
                Ok(Response::Created { session, snapshot })
            }
            Command::JoinSession {
                session,
                player,
                display_name,
            } => self
                .join_session(session, player, display_name)
                .map(Response::Updated),
            Command::ChooseTrump {
                session,
                player,
                suit,
            } => self.choose_trump(session, &player, suit).map(Response::Updated),
            Command::PlayCard {
                session,
                player,
                card,
            } => self.play_card(session, &player, card).map(Response::Updated),
            Command::ShowHand { session, player } => {
                let cards = self.show_hand(session, &player)?;
                Ok(Response::Hand { session, cards })
            }
            Command::CancelSession {
                session,
                player,
                moderator,
            } => {
                let events = self.cancel_session(session, &player, moderator)?;
                Ok(Response::Cancelled { session, events })
            }
        }
    }

    /// Open a lobby and return its id. Fails if the id source repeats the id
    /// of a live session.
    pub fn create_session(
        &self,
        mode: Mode,
        creator: PlayerId,
        display_name: String,
    ) -> Result<SessionId, GameError> {
        let id = self.ids.next_id();
        match self.sessions.entry(id) {
            Entry::Occupied(_) => {
                warn!(session = %id, "id source repeated a live session id");
                Err(GameError::DuplicateSessionId)
            }
            Entry::Vacant(slot) => {
                let rng = self.deals.rng_for(id);
                slot.insert(Session::new(
                    id,
                    mode,
                    self.rules,
                    creator.clone(),
                    display_name,
                    rng,
                ));
                info!(session = %id, ?mode, %creator, "session created");
                Ok(id)
            }
        }
    }

    pub fn join_session(
        &self,
        id: SessionId,
        player: PlayerId,
        display_name: String,
    ) -> Result<ActionResult, GameError> {
        self.mutate(id, |session| session.join(player, display_name))
    }

    pub fn choose_trump(
        &self,
        id: SessionId,
        player: &PlayerId,
        suit: Suit,
    ) -> Result<ActionResult, GameError> {
        self.mutate(id, |session| session.choose_trump(player, suit))
    }

    pub fn play_card(
        &self,
        id: SessionId,
        player: &PlayerId,
        card: Card,
    ) -> Result<ActionResult, GameError> {
        self.mutate(id, |session| session.play_card(player, card))
    }

    /// The caller's own hand. The adapter must deliver it privately.
    pub fn show_hand(&self, id: SessionId, player: &PlayerId) -> Result<Vec<Card>, GameError> {
        let session = self.sessions.get(&id).ok_or(GameError::SessionNotFound)?;
        session.show_hand(player)
    }

    /// Cards the caller may play right now
    pub fn legal_cards(&self, id: SessionId, player: &PlayerId) -> Result<Vec<Card>, GameError> {
        let session = self.sessions.get(&id).ok_or(GameError::SessionNotFound)?;
        session.legal_cards(player)
    }

    pub fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot, GameError> {
        self.sessions
            .get(&id)
            .map(|s| s.snapshot())
            .ok_or(GameError::SessionNotFound)
    }

    /// Lobbies still waiting for players, oldest first
    pub fn open_lobbies(&self) -> Vec<SessionSnapshot> {
        let mut lobbies: Vec<SessionSnapshot> = self
            .sessions
            .iter()
            .filter(|s| s.status() == SessionStatus::Lobby)
            .map(|s| s.snapshot())
            .collect();
        lobbies.sort_by_key(|s| s.id);
        lobbies
    }

    /// Every live session `player` holds a seat in
    pub fn sessions_of(&self, player: &PlayerId) -> Vec<SessionSnapshot> {
        self.sessions
            .iter()
            .filter(|s| s.seat_of(player).is_some())
            .map(|s| s.snapshot())
            .collect()
    }

    /// Discard a session. Only its creator, or a moderator, may do this.
    pub fn cancel_session(
        &self,
        id: SessionId,
        player: &PlayerId,
        moderator: bool,
    ) -> Result<Vec<GameEvent>, GameError> {
        let removed = self.sessions.remove_if(&id, |_, session| {
            session.can_cancel(player, moderator)
        });
        if removed.is_none() {
            if !self.sessions.contains_key(&id) {
                return Err(GameError::SessionNotFound);
            }
            debug!(session = %id, %player, "cancel rejected");
            return Err(GameError::NotAuthorized);
        }

        info!(session = %id, %player, moderator, "session cancelled");
        Ok(vec![GameEvent::SessionCancelled { by: player.clone() }])
    }

    /// Apply `f` under the session's write guard. Finished sessions are
    /// retired from the registry once their final snapshot is taken.
    fn mutate<F>(&self, id: SessionId, f: F) -> Result<ActionResult, GameError>
    where
        F: FnOnce(&mut Session) -> Result<Vec<GameEvent>, GameError>,
    {
        let mut session = self.sessions.get_mut(&id).ok_or(GameError::SessionNotFound)?;
        if session.is_finished() {
            return Err(GameError::SessionNotFound);
        }

        let events = match f(session.value_mut()) {
            Ok(events) => events,
            Err(err) => {
                debug!(session = %id, error = %err, "action rejected");
                return Err(err);
            }
        };
        log_milestones(id, &events);

        let snapshot = session.snapshot();
        let finished = session.is_finished();
        drop(session);

        if finished {
            self.sessions.remove(&id);
            info!(session = %id, "session retired");
        }
        Ok(ActionResult { events, snapshot })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            sessions: DashMap::new(),
            rules: MatchRules::default(),
            ids: Box::new(SequentialIds::default()),
            deals: Box::new(Seeding::Entropy),
        }
    }
}

fn log_milestones(id: SessionId, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::RoundStarted { round, hakem } => {
                info!(session = %id, round, hakem, "round dealt")
            }
            GameEvent::RoundWon {
                round,
                side,
                match_score,
            } => info!(
                session = %id,
                round,
                %side,
                a = match_score.a,
                b = match_score.b,
                "round won"
            ),
            GameEvent::MatchWon { side, .. } => info!(session = %id, %side, "match won"),
            _ => {}
        }
    }
}
