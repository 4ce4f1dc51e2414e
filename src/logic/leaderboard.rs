//! Leaderboard: total order over the catalog by rating points.

use crate::models::{RatingBook, TeamCatalog, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One leaderboard row (rank is 1-based).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub team_id: TeamId,
    pub points: u32,
}

/// Full standings: rating points descending, catalog position breaking ties.
/// A team missing from the book counts at its catalog default rating.
pub fn standings(ratings: &RatingBook, catalog: &TeamCatalog) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<(usize, TeamId, u32)> = catalog
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            let points = ratings.get(&team.id).copied().unwrap_or(team.default_rating);
            (idx, team.id.clone(), points)
        })
        .collect();
    rows.sort_by_key(|(idx, _, points)| (std::cmp::Reverse(*points), *idx));
    rows.into_iter()
        .enumerate()
        .map(|(i, (_, team_id, points))| LeaderboardEntry {
            rank: (i + 1) as u32,
            team_id,
            points,
        })
        .collect()
}

/// 1-based rank per team id.
pub fn ranks(ratings: &RatingBook, catalog: &TeamCatalog) -> HashMap<TeamId, u32> {
    standings(ratings, catalog)
        .into_iter()
        .map(|e| (e.team_id, e.rank))
        .collect()
}

/// Rank of a single team, if it is in the catalog.
pub fn rank_of(ratings: &RatingBook, catalog: &TeamCatalog, team_id: &str) -> Option<u32> {
    standings(ratings, catalog)
        .into_iter()
        .find(|e| e.team_id == team_id)
        .map(|e| e.rank)
}
