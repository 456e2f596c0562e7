//! Match rules: win targets and hakem rotation.

use crate::player::{Mode, Seat, Side};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tricks a side needs to take the round
pub const TRICKS_TO_WIN_ROUND: u8 = 7;

/// Rounds a side needs to take the match
pub const ROUNDS_TO_WIN_MATCH: u8 = 7;

/// How the hakem moves between rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HakemRotation {
    /// The hakem passes to the next seat after every round
    #[default]
    Alternate,
    /// The hakem stays while their side keeps winning, else passes to the next seat
    KeepOnWin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("tricks_to_win_round must be between 1 and 7, got {0}")]
    TricksTarget(u8),

    #[error("rounds_to_win_match must be at least 1")]
    RoundsTarget,
}

/// Tunable parts of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    pub tricks_to_win_round: u8,
    pub rounds_to_win_match: u8,
    /// Rotation used at a 2-player table. 4-player tables always keep the
    /// hakem on a win.
    pub two_player_rotation: HakemRotation,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            tricks_to_win_round: TRICKS_TO_WIN_ROUND,
            rounds_to_win_match: ROUNDS_TO_WIN_MATCH,
            two_player_rotation: HakemRotation::Alternate,
        }
    }
}

impl MatchRules {
    /// A round has 13 tricks, so any target above 7 could leave a round
    /// without a winner.
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(1..=TRICKS_TO_WIN_ROUND).contains(&self.tricks_to_win_round) {
            return Err(RulesError::TricksTarget(self.tricks_to_win_round));
        }
        if self.rounds_to_win_match == 0 {
            return Err(RulesError::RoundsTarget);
        }
        Ok(())
    }

    pub fn rotation_for(&self, mode: Mode) -> HakemRotation {
        match mode {
            Mode::TwoPlayer => self.two_player_rotation,
            Mode::FourPlayer => HakemRotation::KeepOnWin,
        }
    }

    /// The hakem of the next round
    pub fn next_hakem(&self, mode: Mode, hakem: Seat, round_winner: Side) -> Seat {
        match self.rotation_for(mode) {
            HakemRotation::Alternate => mode.next_seat(hakem),
            HakemRotation::KeepOnWin if mode.side_of(hakem) == round_winner => hakem,
            HakemRotation::KeepOnWin => mode.next_seat(hakem),
        }
    }
}
