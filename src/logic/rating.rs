//! Rating points: default book and the fixed per-series delta table.

use crate::logic::leaderboard;
use crate::models::{PlayoffRound, RatingBook, StageKey, TeamCatalog, TeamId};
use serde::Serialize;

/// Where the finished series took place, for delta lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RatingScope {
    Swiss(StageKey),
    Playoff(PlayoffRound),
}

/// Context of a finished series.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RatingContext {
    pub scope: RatingScope,
    pub best_of: u8,
    /// Sets the losing team still managed to take.
    pub loser_sets_won: u8,
}

/// One team's rating movement from a commit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RatingShift {
    pub team_id: TeamId,
    pub points_before: u32,
    pub points_after: u32,
    pub rank_before: u32,
    pub rank_after: u32,
}

/// Movement of both teams, with ranks taken before and after the update.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RatingMeta {
    pub winner: RatingShift,
    pub loser: RatingShift,
}

/// Fresh book from the catalog's default ratings.
pub fn default_book(catalog: &TeamCatalog) -> RatingBook {
    catalog
        .iter()
        .map(|t| (t.id.clone(), t.default_rating))
        .collect()
}

/// Winner gain and loser drop for one series. The drop shrinks when the
/// loser kept the series close; the grand final loser drops nothing.
fn deltas(ctx: &RatingContext) -> (u32, u32) {
    match ctx.scope {
        RatingScope::Swiss(stage) => {
            let bo3 = ctx.best_of >= 3;
            match (stage, bo3) {
                (StageKey::Stage1, false) => (3, 2),
                (StageKey::Stage1, true) => (5, if ctx.loser_sets_won >= 1 { 2 } else { 3 }),
                (StageKey::Stage2, false) => (4, 2),
                (StageKey::Stage2, true) => (8, if ctx.loser_sets_won >= 1 { 2 } else { 4 }),
                (StageKey::Stage3, false) => (7, 4),
                (StageKey::Stage3, true) => (10, if ctx.loser_sets_won >= 1 { 4 } else { 7 }),
            }
        }
        RatingScope::Playoff(round) => match round {
            PlayoffRound::Ro16 => (13, if ctx.loser_sets_won >= 1 { 6 } else { 8 }),
            PlayoffRound::Quarterfinal => (
                20,
                match ctx.loser_sets_won {
                    2.. => 8,
                    1 => 10,
                    0 => 13,
                },
            ),
            PlayoffRound::Semifinal => (
                30,
                match ctx.loser_sets_won {
                    3.. => 10,
                    2 => 13,
                    1 => 16,
                    0 => 18,
                },
            ),
            PlayoffRound::ThirdPlace => (
                35,
                match ctx.loser_sets_won {
                    3.. => 10,
                    2 => 13,
                    1 => 16,
                    0 => 20,
                },
            ),
            PlayoffRound::GrandFinal => (50, 0),
        },
    }
}

fn points_of(ratings: &RatingBook, catalog: &TeamCatalog, team_id: &str) -> u32 {
    ratings
        .get(team_id)
        .copied()
        .unwrap_or_else(|| catalog.get(team_id).map_or(0, |t| t.default_rating))
}

/// Apply one series result. Pure over the given book: returns the updated
/// book plus before/after points and ranks for both teams. The loser's
/// drop saturates at zero.
pub fn apply_result(
    ratings: &RatingBook,
    catalog: &TeamCatalog,
    winner_id: &str,
    loser_id: &str,
    ctx: RatingContext,
) -> (RatingBook, RatingMeta) {
    let (gain, drop) = deltas(&ctx);

    let ranks_before = leaderboard::ranks(ratings, catalog);
    let winner_before = points_of(ratings, catalog, winner_id);
    let loser_before = points_of(ratings, catalog, loser_id);

    let winner_after = winner_before.saturating_add(gain);
    let loser_after = loser_before.saturating_sub(drop);

    let mut next = ratings.clone();
    next.insert(winner_id.to_string(), winner_after);
    next.insert(loser_id.to_string(), loser_after);

    let ranks_after = leaderboard::ranks(&next, catalog);
    let rank = |map: &std::collections::HashMap<TeamId, u32>, id: &str| {
        map.get(id).copied().unwrap_or(0)
    };

    let meta = RatingMeta {
        winner: RatingShift {
            team_id: winner_id.to_string(),
            points_before: winner_before,
            points_after: winner_after,
            rank_before: rank(&ranks_before, winner_id),
            rank_after: rank(&ranks_after, winner_id),
        },
        loser: RatingShift {
            team_id: loser_id.to_string(),
            points_before: loser_before,
            points_after: loser_after,
            rank_before: rank(&ranks_before, loser_id),
            rank_after: rank(&ranks_after, loser_id),
        },
    };

    (next, meta)
}
