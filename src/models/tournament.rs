//! Tournament aggregate, phases, pick'em totals, errors, and saved state.

use crate::models::playoffs::{FinalPlacements, PlayoffsBracket};
use crate::models::series::SeriesState;
use crate::models::swiss::{StageKey, SwissStage};
use crate::models::team::{Placings, RatingBook, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during engine operations. An error never leaves
/// partial state behind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// Operation does not apply to the current phase.
    InvalidPhase,
    MatchNotFound,
    /// Match is not open yet: its net is locked, an earlier match in the
    /// net is unplayed, or a feeding round is unfinished.
    MatchLocked,
    AlreadyPlayed,
    /// Match has no opponent (bye); it cannot be picked or started.
    MissingOpponent,
    /// The chosen team is not in this match.
    TeamNotInMatch(TeamId),
    /// Starting a match requires a recorded pick.
    PickMissing,
    /// A series is already running.
    SeriesActive,
    /// No series is running.
    SeriesNotActive,
    /// The running series has no winner yet.
    SeriesUnfinished,
    /// The running series is decided and waits for its commit.
    SeriesFinished,
    TeamNotFound(TeamId),
    /// A builder was handed too few teams.
    NotEnoughTeams { needed: usize, have: usize },
    /// Persistence or asset parsing failed.
    Storage(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidPhase => write!(f, "Action is not valid in the current phase"),
            EngineError::MatchNotFound => write!(f, "Match not found"),
            EngineError::MatchLocked => write!(f, "Match is not open yet"),
            EngineError::AlreadyPlayed => write!(f, "Match has already been played"),
            EngineError::MissingOpponent => write!(f, "Match has no opponent"),
            EngineError::TeamNotInMatch(id) => write!(f, "Team {} is not in this match", id),
            EngineError::PickMissing => write!(f, "Pick a team before starting the match"),
            EngineError::SeriesActive => write!(f, "A series is already running"),
            EngineError::SeriesNotActive => write!(f, "No series is running"),
            EngineError::SeriesUnfinished => write!(f, "The series has no winner yet"),
            EngineError::SeriesFinished => write!(f, "The series is decided; commit it first"),
            EngineError::TeamNotFound(id) => write!(f, "Team {} not found", id),
            EngineError::NotEnoughTeams { needed, have } => {
                write!(f, "Need at least {} teams, have {}", needed, have)
            }
            EngineError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

/// Unique identifier for one tournament run.
pub type TournamentId = Uuid;

/// Current phase of the simulated tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Stage1,
    Stage2,
    Stage3,
    Playoffs,
    Completed,
}

impl Phase {
    /// The Swiss stage active in this phase, if any.
    pub fn stage_key(&self) -> Option<StageKey> {
        match self {
            Phase::Stage1 => Some(StageKey::Stage1),
            Phase::Stage2 => Some(StageKey::Stage2),
            Phase::Stage3 => Some(StageKey::Stage3),
            _ => None,
        }
    }
}

impl From<StageKey> for Phase {
    fn from(key: StageKey) -> Self {
        match key {
            StageKey::Stage1 => Phase::Stage1,
            StageKey::Stage2 => Phase::Stage2,
            StageKey::Stage3 => Phase::Stage3,
        }
    }
}

/// Per-bracket slice of the pick'em score.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PickemLine {
    pub points: u32,
    /// Matches where the picked team won.
    pub correct: u32,
}

/// Prediction score, recomputed in full from played matches.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PickemTotals {
    pub total_points: u32,
    pub stage1: PickemLine,
    pub stage2: PickemLine,
    pub stage3: PickemLine,
    pub playoffs: PickemLine,
}

/// Full simulator state for one tournament run.
///
/// Stages appear as they are reached: `stage1` exists from creation, later
/// stages and the playoff bracket are `None` until the previous phase
/// finishes. The seed lists hold the leaderboard teams reserved for the
/// later stages, captured at creation time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub phase: Phase,
    pub stage1: Option<SwissStage>,
    pub stage2: Option<SwissStage>,
    pub stage3: Option<SwissStage>,
    /// Leaderboard ranks 17-32 at creation, joining in Stage II.
    pub stage2_seeds: Vec<TeamId>,
    /// Leaderboard ranks 1-16 at creation, joining in Stage III.
    pub stage3_seeds: Vec<TeamId>,
    pub playoffs: Option<PlayoffsBracket>,
    pub series: SeriesState,
    pub pickem: PickemTotals,
    /// Set once the grand final is committed.
    pub placements: Option<FinalPlacements>,
}

impl Tournament {
    pub fn stage(&self, key: StageKey) -> Option<&SwissStage> {
        match key {
            StageKey::Stage1 => self.stage1.as_ref(),
            StageKey::Stage2 => self.stage2.as_ref(),
            StageKey::Stage3 => self.stage3.as_ref(),
        }
    }

    pub fn stage_mut(&mut self, key: StageKey) -> Option<&mut SwissStage> {
        match key {
            StageKey::Stage1 => self.stage1.as_mut(),
            StageKey::Stage2 => self.stage2.as_mut(),
            StageKey::Stage3 => self.stage3.as_mut(),
        }
    }

    /// The Swiss stage matching the current phase, if in a Swiss phase.
    pub fn current_stage(&self) -> Option<&SwissStage> {
        self.phase.stage_key().and_then(|k| self.stage(k))
    }
}

/// Everything the app persists between restarts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub saved_at: DateTime<Utc>,
    pub ratings: RatingBook,
    pub placings: Placings,
    /// The running (or completed) tournament, if one was ever started.
    pub tournament: Option<Tournament>,
}
