//! Playoff bracket data structures: rounds, matches, final placements.

use crate::models::series::SetRecord;
use crate::models::swiss::MatchId;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bracket round, in play order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffRound {
    Ro16,
    Quarterfinal,
    Semifinal,
    ThirdPlace,
    GrandFinal,
}

impl PlayoffRound {
    /// All rounds in the order they are played.
    pub const ALL: [PlayoffRound; 5] = [
        PlayoffRound::Ro16,
        PlayoffRound::Quarterfinal,
        PlayoffRound::Semifinal,
        PlayoffRound::ThirdPlace,
        PlayoffRound::GrandFinal,
    ];

    /// Series length per round: BO3, BO5, BO7, BO7, BO9.
    pub fn best_of(&self) -> u8 {
        match self {
            PlayoffRound::Ro16 => 3,
            PlayoffRound::Quarterfinal => 5,
            PlayoffRound::Semifinal => 7,
            PlayoffRound::ThirdPlace => 7,
            PlayoffRound::GrandFinal => 9,
        }
    }

    pub fn match_count(&self) -> usize {
        match self {
            PlayoffRound::Ro16 => 8,
            PlayoffRound::Quarterfinal => 4,
            PlayoffRound::Semifinal => 2,
            PlayoffRound::ThirdPlace => 1,
            PlayoffRound::GrandFinal => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayoffRound::Ro16 => "Round of 16",
            PlayoffRound::Quarterfinal => "Quarterfinal",
            PlayoffRound::Semifinal => "Semifinal",
            PlayoffRound::ThirdPlace => "Third place",
            PlayoffRound::GrandFinal => "Grand final",
        }
    }
}

/// One bracket pairing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayoffMatch {
    pub id: MatchId,
    pub round: PlayoffRound,
    /// Position inside the round; matches open strictly left to right.
    pub match_no: u32,
    pub slot_a: Option<TeamId>,
    /// Slots stay empty until the feeding matches decide them.
    pub slot_b: Option<TeamId>,
    pub played: bool,
    pub score_a: u8,
    pub score_b: u8,
    pub winner: Option<TeamId>,
    pub pick: Option<TeamId>,
    /// Per-set round scores from the simulated series, oriented to the pick.
    pub set_history: Vec<SetRecord>,
}

impl PlayoffMatch {
    pub fn new(
        round: PlayoffRound,
        match_no: u32,
        slot_a: Option<TeamId>,
        slot_b: Option<TeamId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_no,
            slot_a,
            slot_b,
            played: false,
            score_a: 0,
            score_b: 0,
            winner: None,
            pick: None,
            set_history: Vec::new(),
        }
    }

    pub fn is_bye(&self) -> bool {
        self.slot_a.is_none() || self.slot_b.is_none()
    }

    pub fn has_team(&self, id: &str) -> bool {
        self.slot_a.as_deref() == Some(id) || self.slot_b.as_deref() == Some(id)
    }

    /// The team in the other slot, if both are present.
    pub fn opponent_of(&self, id: &str) -> Option<&TeamId> {
        if self.slot_a.as_deref() == Some(id) {
            self.slot_b.as_ref()
        } else if self.slot_b.as_deref() == Some(id) {
            self.slot_a.as_ref()
        } else {
            None
        }
    }
}

/// The 16-team single elimination bracket, including a third place decider.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayoffsBracket {
    pub ro16: Vec<PlayoffMatch>,
    pub quarterfinals: Vec<PlayoffMatch>,
    pub semifinals: Vec<PlayoffMatch>,
    pub third_place: Vec<PlayoffMatch>,
    pub grand_final: Vec<PlayoffMatch>,
}

impl PlayoffsBracket {
    pub fn round(&self, round: PlayoffRound) -> &[PlayoffMatch] {
        match round {
            PlayoffRound::Ro16 => &self.ro16,
            PlayoffRound::Quarterfinal => &self.quarterfinals,
            PlayoffRound::Semifinal => &self.semifinals,
            PlayoffRound::ThirdPlace => &self.third_place,
            PlayoffRound::GrandFinal => &self.grand_final,
        }
    }

    pub fn round_mut(&mut self, round: PlayoffRound) -> &mut Vec<PlayoffMatch> {
        match round {
            PlayoffRound::Ro16 => &mut self.ro16,
            PlayoffRound::Quarterfinal => &mut self.quarterfinals,
            PlayoffRound::Semifinal => &mut self.semifinals,
            PlayoffRound::ThirdPlace => &mut self.third_place,
            PlayoffRound::GrandFinal => &mut self.grand_final,
        }
    }

    /// Locate a match by id.
    pub fn find_match(&self, id: MatchId) -> Option<(PlayoffRound, usize)> {
        for round in PlayoffRound::ALL {
            if let Some(mi) = self.round(round).iter().position(|m| m.id == id) {
                return Some((round, mi));
            }
        }
        None
    }

    pub fn round_finished(&self, round: PlayoffRound) -> bool {
        self.round(round).iter().all(|m| m.played)
    }

    /// Every match in the bracket has a result.
    pub fn finished(&self) -> bool {
        PlayoffRound::ALL.iter().all(|&r| self.round_finished(r))
    }
}

/// Final standings once the grand final has been played.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FinalPlacements {
    pub winner: TeamId,
    pub runner_up: TeamId,
    /// Winner and loser of the third place decider.
    pub third: TeamId,
    pub fourth: TeamId,
}
