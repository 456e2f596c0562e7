//! Public view of a session.
//!
//! A snapshot is safe to broadcast to everyone at the table: it carries hand
//! sizes but never the cards in a hand. Hands are only available through
//! [`crate::Session::show_hand`].

use crate::card::{Card, Suit};
use crate::player::{Mode, PlayerId, Seat, Side, SideScore};
use crate::round::RoundPhase;
use crate::session::{Session, SessionId, SessionStatus};
use crate::trick::Play;
use serde::{Deserialize, Serialize};

/// A seated player as everyone sees them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: Seat,
    pub player: PlayerId,
    pub name: String,
    pub side: Side,
    pub cards_in_hand: usize,
}

/// A card on the table and who played it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayView {
    pub seat: Seat,
    pub player: PlayerId,
    pub card: Card,
}

impl PlayView {
    pub fn play(&self) -> Play {
        Play::new(self.seat, self.card)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickView {
    pub plays: Vec<PlayView>,
    pub winner: Seat,
}

/// Everything about a session that is public
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub mode: Mode,
    pub status: SessionStatus,
    pub capacity: usize,
    pub seats: Vec<SeatView>,
    pub round: Option<u32>,
    pub hakem: Option<Seat>,
    pub trump: Option<Suit>,
    pub current_trick: Vec<PlayView>,
    pub last_trick: Option<TrickView>,
    pub trick_score: SideScore,
    pub match_score: SideScore,
    /// Seat expected to act: the hakem while trump is open, else the next to play
    pub turn: Option<Seat>,
}

impl SessionSnapshot {
    pub(crate) fn of(session: &Session) -> Self {
        let round = session.round.as_ref();
        let play_view = |play: &Play| PlayView {
            seat: play.seat,
            player: session
                .player_at(play.seat)
                .map(|p| p.id.clone())
                .unwrap_or_else(|| PlayerId::new("")),
            card: play.card,
        };

        let seats = session
            .players
            .iter()
            .map(|p| SeatView {
                seat: p.seat,
                player: p.id.clone(),
                name: p.name.clone(),
                side: session.mode.side_of(p.seat),
                cards_in_hand: round
                    .and_then(|r| r.hand(p.seat))
                    .map_or(0, |h| h.len()),
            })
            .collect();

        let turn = round.and_then(|r| match r.phase {
            RoundPhase::ChoosingTrump | RoundPhase::Playing if !session.is_finished() => {
                Some(r.turn)
            }
            _ => None,
        });

        Self {
            id: session.id,
            mode: session.mode,
            status: session.status(),
            capacity: session.mode.capacity(),
            seats,
            round: round.map(|r| r.number),
            hakem: round.map(|r| r.hakem),
            trump: round.and_then(|r| r.trump),
            current_trick: round
                .map(|r| r.trick.iter().map(play_view).collect())
                .unwrap_or_default(),
            last_trick: round.and_then(|r| r.last_trick.as_ref()).map(|t| TrickView {
                plays: t.plays.iter().map(play_view).collect(),
                winner: t.winner,
            }),
            trick_score: round.map(|r| r.trick_score).unwrap_or_default(),
            match_score: session.match_score,
            turn,
        }
    }

    pub fn seat_of(&self, player: &PlayerId) -> Option<Seat> {
        self.seats.iter().find(|s| &s.player == player).map(|s| s.seat)
    }

    /// The player expected to act next
    pub fn turn_player(&self) -> Option<&PlayerId> {
        let seat = self.turn?;
        self.seats.get(seat as usize).map(|s| &s.player)
    }

    /// Plays of the current trick in engine form
    pub fn trick_plays(&self) -> Vec<Play> {
        self.current_trick.iter().map(PlayView::play).collect()
    }
}
