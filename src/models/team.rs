//! Team catalog, rating book, and all-time placing counts.

use crate::models::tournament::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a team (stable slug from the catalog).
pub type TeamId = String;

/// Current rating points per team. Ratings never go below zero.
pub type RatingBook = HashMap<TeamId, u32>;

/// All-time trophy counts per team, keyed by team id.
pub type Placings = HashMap<TeamId, PlacingCounts>;

/// Embedded team catalog; the app ships with exactly 64 teams.
pub const TEAMS_CSV: &str = include_str!("../../assets/teams.csv");

/// One catalog entry. `default_rating` is the rating a fresh book starts from.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: TeamId,
    pub name: String,
    /// Display color (hex), used by the frontend only.
    pub color: String,
    pub default_rating: u32,
}

/// The fixed list of competing teams, in catalog order.
///
/// Catalog order doubles as the leaderboard tie-break: when two teams have
/// equal rating points the one listed earlier ranks higher.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamCatalog {
    teams: Vec<TeamInfo>,
}

impl TeamCatalog {
    /// Build a catalog from an explicit team list (tests use small ones).
    pub fn new(teams: Vec<TeamInfo>) -> Self {
        Self { teams }
    }

    /// Parse a catalog from CSV with an `id,name,color,default_rating` header.
    pub fn from_csv(data: &str) -> Result<Self, EngineError> {
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let mut teams = Vec::new();
        for row in reader.deserialize() {
            let team: TeamInfo =
                row.map_err(|e| EngineError::Storage(format!("bad team row: {}", e)))?;
            teams.push(team);
        }
        Ok(Self { teams })
    }

    /// The shipped 64-team catalog. Validates count and id uniqueness.
    pub fn embedded() -> Result<Self, EngineError> {
        let catalog = Self::from_csv(TEAMS_CSV)?;
        if catalog.teams.len() != 64 {
            return Err(EngineError::Storage(format!(
                "team catalog has {} teams, expected 64",
                catalog.teams.len()
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for t in &catalog.teams {
            if !seen.insert(t.id.as_str()) {
                return Err(EngineError::Storage(format!("duplicate team id: {}", t.id)));
            }
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TeamInfo> {
        self.teams.iter()
    }

    /// Look up a team by id.
    pub fn get(&self, id: &str) -> Option<&TeamInfo> {
        self.teams.iter().find(|t| t.id == id)
    }
}

/// Trophy counts for one team across all completed tournaments.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlacingCounts {
    pub first: u32,
    pub second: u32,
    pub third: u32,
}
