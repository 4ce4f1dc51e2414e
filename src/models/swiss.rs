//! Swiss stage data structures: nets, pairings, and per-team records.

use crate::models::series::SetRecord;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match (Swiss or playoff).
pub type MatchId = Uuid;

/// Which of the three Swiss stages a bracket belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKey {
    Stage1,
    Stage2,
    Stage3,
}

/// A win/loss bucket in the Swiss bracket (a "net"), e.g. 2:1.
///
/// Teams with identical records meet inside the same net; a team leaves the
/// bracket at three wins (qualified) or three losses (eliminated).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub wins: u8,
    pub losses: u8,
}

/// The nine nets in column order, left to right and top to bottom.
pub const ALL_NETS: [Net; 9] = [
    Net::new(0, 0),
    Net::new(1, 0),
    Net::new(0, 1),
    Net::new(2, 0),
    Net::new(1, 1),
    Net::new(0, 2),
    Net::new(2, 1),
    Net::new(1, 2),
    Net::new(2, 2),
];

impl Net {
    pub const fn new(wins: u8, losses: u8) -> Self {
        Self { wins, losses }
    }

    /// Column in the bracket layout: total games played at this record.
    pub fn column(&self) -> u8 {
        self.wins + self.losses
    }

    /// Matches up to 1:1 are best-of-one; the 2:x and x:2 nets are best-of-three.
    pub fn best_of(&self) -> u8 {
        if self.wins <= 1 && self.losses <= 1 {
            1
        } else {
            3
        }
    }

    pub fn label(&self) -> String {
        format!("{}:{}", self.wins, self.losses)
    }
}

/// Per-stage record of one competing team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SwissTeam {
    pub team_id: TeamId,
    pub wins: u8,
    pub losses: u8,
    /// Final record once decided, e.g. "3:1" or "2:3".
    pub decided_via: Option<String>,
    /// Stage-local order stamp set when the team reached three wins.
    pub qualified_at: Option<u32>,
    /// Stage-local order stamp set when the team reached three losses.
    pub eliminated_at: Option<u32>,
}

impl SwissTeam {
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            wins: 0,
            losses: 0,
            decided_via: None,
            qualified_at: None,
            eliminated_at: None,
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.qualified_at.is_some()
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated_at.is_some()
    }

    /// Qualified or eliminated; a decided team never enters another net.
    pub fn is_decided(&self) -> bool {
        self.is_qualified() || self.is_eliminated()
    }

    /// The net this team currently sits in (meaningless once decided).
    pub fn net(&self) -> Net {
        Net::new(self.wins, self.losses)
    }
}

/// One pairing inside a net.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SwissMatch {
    pub id: MatchId,
    pub net: Net,
    /// Position inside the net; matches open strictly left to right.
    pub match_no: u32,
    pub slot_a: Option<TeamId>,
    /// None marks a bye (odd team left over when pairing the net).
    pub slot_b: Option<TeamId>,
    pub played: bool,
    /// Sets taken by slot A / slot B once played.
    pub score_a: u8,
    pub score_b: u8,
    pub winner: Option<TeamId>,
    /// The user's predicted winner, if any.
    pub pick: Option<TeamId>,
    /// Per-set round scores from the simulated series, oriented to the pick.
    pub set_history: Vec<SetRecord>,
}

impl SwissMatch {
    pub fn new(net: Net, match_no: u32, slot_a: Option<TeamId>, slot_b: Option<TeamId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            net,
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

    /// A match missing a slot can never be played.
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

/// One net together with its pairings. `built` flips when the pairings are
/// generated; a net only builds once every net in the previous column is
/// fully played.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NetState {
    pub net: Net,
    pub built: bool,
    pub matches: Vec<SwissMatch>,
}

impl NetState {
    pub fn new(net: Net) -> Self {
        Self {
            net,
            built: false,
            matches: Vec::new(),
        }
    }

    /// Built and every pairing has a result (byes resolve at build time).
    pub fn finished(&self) -> bool {
        self.built && self.matches.iter().all(|m| m.played)
    }
}

/// One full Swiss stage: a field of teams fighting to three wins before
/// three losses, laid out over the nine nets.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SwissStage {
    pub key: StageKey,
    pub teams: Vec<SwissTeam>,
    /// The nine nets in column order.
    pub nets: Vec<NetState>,
    /// Monotonic stamp source for qualification/elimination order.
    pub decision_counter: u32,
}

impl SwissStage {
    /// Fresh stage with empty nets; pairings come from the stage builder.
    pub fn new(key: StageKey, teams: Vec<SwissTeam>) -> Self {
        Self {
            key,
            teams,
            nets: ALL_NETS.iter().map(|&n| NetState::new(n)).collect(),
            decision_counter: 0,
        }
    }

    pub fn team(&self, id: &str) -> Option<&SwissTeam> {
        self.teams.iter().find(|t| t.team_id == id)
    }

    pub fn team_mut(&mut self, id: &str) -> Option<&mut SwissTeam> {
        self.teams.iter_mut().find(|t| t.team_id == id)
    }

    pub fn net_state(&self, net: Net) -> Option<&NetState> {
        self.nets.iter().find(|n| n.net == net)
    }

    pub fn net_state_mut(&mut self, net: Net) -> Option<&mut NetState> {
        self.nets.iter_mut().find(|n| n.net == net)
    }

    /// Locate a match by id: (net index, match index).
    pub fn find_match(&self, id: MatchId) -> Option<(usize, usize)> {
        for (ni, net) in self.nets.iter().enumerate() {
            if let Some(mi) = net.matches.iter().position(|m| m.id == id) {
                return Some((ni, mi));
            }
        }
        None
    }

    /// Every team has either qualified or been eliminated.
    pub fn finished(&self) -> bool {
        self.teams.iter().all(|t| t.is_decided())
    }

    /// Qualified teams in qualification order (earliest first).
    pub fn qualifiers(&self) -> Vec<TeamId> {
        let mut q: Vec<&SwissTeam> = self.teams.iter().filter(|t| t.is_qualified()).collect();
        q.sort_by_key(|t| t.qualified_at);
        q.into_iter().map(|t| t.team_id.clone()).collect()
    }
}
