//! Tournament orchestration: creation, picks, the series lifecycle, and
//! stage advancement.

use crate::logic::rating::{self, RatingContext, RatingMeta, RatingScope};
use crate::logic::{leaderboard, pickem, playoffs, series, swiss};
use crate::models::{
    EngineError, FinalPlacements, GambleSettings, MatchRef, Phase, PickemTotals, Placings,
    PlayoffRound, RatingBook, SeriesState, StageKey, TeamCatalog, TeamId, Tournament,
};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// Everything a committed series changed, for the caller's display.
#[derive(Clone, Debug, Serialize)]
pub struct CommitOutcome {
    pub source: MatchRef,
    pub winner: TeamId,
    pub loser: TeamId,
    /// Final sets score in slot orientation.
    pub score_a: u8,
    pub score_b: u8,
    pub rating: RatingMeta,
    /// Phase entered by this commit, if it advanced the tournament.
    pub advanced_to: Option<Phase>,
    /// Final standings, present only on the grand final commit.
    pub placements: Option<FinalPlacements>,
}

/// Create a fresh tournament from the current standings.
///
/// The leaderboard splits into quarters: the top quarter sits out until
/// Stage III, the second quarter until Stage II, and the bottom half forms
/// the Stage I field. Each later stage unites its reserved seeds with the
/// qualifiers promoted from the stage before.
pub fn create_tournament(
    catalog: &TeamCatalog,
    ratings: &RatingBook,
    rng: &mut impl Rng,
) -> Result<Tournament, EngineError> {
    let standings = leaderboard::standings(ratings, catalog);
    let n = standings.len();
    if n < 4 {
        return Err(EngineError::NotEnoughTeams { needed: 4, have: n });
    }
    let quarter = n / 4;
    let ids: Vec<TeamId> = standings.into_iter().map(|e| e.team_id).collect();
    let stage3_seeds = ids[..quarter].to_vec();
    let stage2_seeds = ids[quarter..quarter * 2].to_vec();
    let field = &ids[quarter * 2..];

    let stage1 = swiss::build_stage(StageKey::Stage1, field, rng)?;
    let id = Uuid::new_v4();
    log::info!(
        "tournament {} created: {} teams in stage one, {} seeded into each later stage",
        id,
        field.len(),
        quarter
    );
    Ok(Tournament {
        id,
        phase: Phase::Stage1,
        stage1: Some(stage1),
        stage2: None,
        stage3: None,
        stage2_seeds,
        stage3_seeds,
        playoffs: None,
        series: SeriesState::idle(),
        pickem: PickemTotals::default(),
        placements: None,
    })
}

/// Record the user's predicted winner on a match. Picks are predictions,
/// not scheduling: any existing, undecided pairing accepts one, except the
/// match bound to a live series.
pub fn pick_match(
    t: &mut Tournament,
    match_ref: &MatchRef,
    team_id: &str,
) -> Result<(), EngineError> {
    if t.series.active {
        if let Some(src) = &t.series.source {
            if src.match_id() == match_ref.match_id() {
                return Err(EngineError::SeriesActive);
            }
        }
    }

    match match_ref {
        MatchRef::Swiss { stage, match_id } => {
            let stage = t.stage_mut(*stage).ok_or(EngineError::MatchNotFound)?;
            swiss::pick_allowed(stage, *match_id)?;
            let (ni, mi) = stage.find_match(*match_id).ok_or(EngineError::MatchNotFound)?;
            let m = &mut stage.nets[ni].matches[mi];
            if !m.has_team(team_id) {
                return Err(EngineError::TeamNotInMatch(team_id.to_string()));
            }
            m.pick = Some(team_id.to_string());
        }
        MatchRef::Playoff { round, match_id } => {
            let bracket = t.playoffs.as_mut().ok_or(EngineError::MatchNotFound)?;
            let (actual, mi) = bracket
                .find_match(*match_id)
                .ok_or(EngineError::MatchNotFound)?;
            if actual != *round {
                return Err(EngineError::MatchNotFound);
            }
            playoffs::pick_allowed(bracket, *match_id)?;
            let m = &mut bracket.round_mut(actual)[mi];
            if !m.has_team(team_id) {
                return Err(EngineError::TeamNotInMatch(team_id.to_string()));
            }
            m.pick = Some(team_id.to_string());
        }
    }
    Ok(())
}

/// Start the series for a picked, open match of the current phase.
pub fn start_match(t: &mut Tournament, match_ref: &MatchRef) -> Result<(), EngineError> {
    if t.series.active {
        return Err(EngineError::SeriesActive);
    }

    let (pick, opponent, best_of) = match match_ref {
        MatchRef::Swiss { stage: key, match_id } => {
            if t.phase.stage_key() != Some(*key) {
                return Err(EngineError::InvalidPhase);
            }
            let stage = t.stage(*key).ok_or(EngineError::MatchNotFound)?;
            swiss::match_available(stage, *match_id)?;
            let (ni, mi) = stage.find_match(*match_id).ok_or(EngineError::MatchNotFound)?;
            let m = &stage.nets[ni].matches[mi];
            let pick = m.pick.clone().ok_or(EngineError::PickMissing)?;
            let opponent = m
                .opponent_of(&pick)
                .cloned()
                .ok_or(EngineError::MissingOpponent)?;
            (pick, opponent, m.net.best_of())
        }
        MatchRef::Playoff { round, match_id } => {
            if t.phase != Phase::Playoffs {
                return Err(EngineError::InvalidPhase);
            }
            let bracket = t.playoffs.as_ref().ok_or(EngineError::MatchNotFound)?;
            let (actual, mi) = bracket
                .find_match(*match_id)
                .ok_or(EngineError::MatchNotFound)?;
            if actual != *round {
                return Err(EngineError::MatchNotFound);
            }
            playoffs::can_open_match(bracket, *match_id)?;
            let m = &bracket.round(actual)[mi];
            let pick = m.pick.clone().ok_or(EngineError::PickMissing)?;
            let opponent = m
                .opponent_of(&pick)
                .cloned()
                .ok_or(EngineError::MissingOpponent)?;
            (pick, opponent, actual.best_of())
        }
    };

    t.series = series::start_series(match_ref.clone(), pick, opponent, best_of);
    Ok(())
}

/// One gamble step: draw a multiplier and apply it to the live series.
/// Returns the drawn multiplier for display.
pub fn gamble(
    t: &mut Tournament,
    rng: &mut impl Rng,
    settings: &GambleSettings,
) -> Result<f64, EngineError> {
    if !t.series.active {
        return Err(EngineError::SeriesNotActive);
    }
    if t.series.finished() {
        return Err(EngineError::SeriesFinished);
    }
    let multiplier = series::draw_multiplier(rng, settings);
    t.series = series::apply_gamble(&t.series, multiplier);
    Ok(multiplier)
}

/// Commit the decided series into its match: write the result, pay out
/// ratings, rebuild what unlocked, advance the phase when a stage ends,
/// and reset the series. Requires a terminal banner.
pub fn commit_series(
    t: &mut Tournament,
    ratings: &mut RatingBook,
    placings: &mut Placings,
    catalog: &TeamCatalog,
    rng: &mut impl Rng,
) -> Result<CommitOutcome, EngineError> {
    if !t.series.active {
        return Err(EngineError::SeriesNotActive);
    }
    if !t.series.finished() {
        return Err(EngineError::SeriesUnfinished);
    }

    let snapshot = t.series.clone();
    let source = snapshot.source.clone().ok_or(EngineError::SeriesNotActive)?;
    let left = snapshot
        .left_team
        .clone()
        .ok_or(EngineError::SeriesNotActive)?;
    let right = snapshot
        .right_team
        .clone()
        .ok_or(EngineError::SeriesNotActive)?;
    let left_won = snapshot.sets_won >= snapshot.sets_to_win;
    let (winner, loser) = if left_won {
        (left, right)
    } else {
        (right, left)
    };
    let loser_sets = if left_won {
        snapshot.sets_lost
    } else {
        snapshot.sets_won
    };

    let mut advanced_to = None;
    let mut placements = None;

    let (scope, score_a, score_b, board) = match &source {
        MatchRef::Swiss { stage: key, match_id } => {
            if t.phase.stage_key() != Some(*key) {
                return Err(EngineError::InvalidPhase);
            }
            let (sa, sb, stage_done, qualifiers, board) = {
                let stage = t.stage_mut(*key).ok_or(EngineError::MatchNotFound)?;
                let (ni, mi) = stage.find_match(*match_id).ok_or(EngineError::MatchNotFound)?;
                let slot_a = stage.nets[ni].matches[mi]
                    .slot_a
                    .clone()
                    .ok_or(EngineError::MissingOpponent)?;
                let board = format!("net {}", stage.nets[ni].net.label());
                let (sa, sb) = series::slot_scores(&snapshot, &slot_a);
                swiss::resolve_match(stage, *match_id, &winner, sa, sb, snapshot.set_history.clone())?;
                swiss::build_unlocked_nets(stage, rng);
                let done = stage.finished();
                let q = if done { stage.qualifiers() } else { Vec::new() };
                (sa, sb, done, q, board)
            };

            if stage_done {
                advanced_to = Some(advance_from_swiss(t, *key, qualifiers, rng)?);
            }
            (RatingScope::Swiss(*key), sa, sb, board)
        }
        MatchRef::Playoff { round, match_id } => {
            if t.phase != Phase::Playoffs {
                return Err(EngineError::InvalidPhase);
            }
            let (sa, sb, finished) = {
                let bracket = t.playoffs.as_mut().ok_or(EngineError::MatchNotFound)?;
                let (actual, mi) = bracket
                    .find_match(*match_id)
                    .ok_or(EngineError::MatchNotFound)?;
                if actual != *round {
                    return Err(EngineError::MatchNotFound);
                }
                let slot_a = bracket.round(actual)[mi]
                    .slot_a
                    .clone()
                    .ok_or(EngineError::MissingOpponent)?;
                let (sa, sb) = series::slot_scores(&snapshot, &slot_a);
                let finished = playoffs::resolve_match(
                    bracket,
                    *match_id,
                    &winner,
                    sa,
                    sb,
                    snapshot.set_history.clone(),
                )?;
                (sa, sb, finished)
            };

            if let Some(pl) = finished {
                record_placings(placings, &pl);
                t.placements = Some(pl.clone());
                t.phase = Phase::Completed;
                advanced_to = Some(Phase::Completed);
                placements = Some(pl);
            }
            (RatingScope::Playoff(*round), sa, sb, round.label().to_string())
        }
    };

    let ctx = RatingContext {
        scope,
        best_of: snapshot.best_of,
        loser_sets_won: loser_sets,
    };
    let (next, meta) = rating::apply_result(ratings, catalog, &winner, &loser, ctx);
    *ratings = next;
    log::info!(
        "{} beat {} {}:{} in {} ({} -> {}, {} -> {})",
        winner,
        loser,
        score_a,
        score_b,
        board,
        meta.winner.points_before,
        meta.winner.points_after,
        meta.loser.points_before,
        meta.loser.points_after
    );

    t.pickem = pickem::recompute(t);
    t.series = SeriesState::idle();

    Ok(CommitOutcome {
        source,
        winner,
        loser,
        score_a,
        score_b,
        rating: meta,
        advanced_to,
        placements,
    })
}

/// Promote a finished Swiss stage: qualifiers plus the reserved seeds form
/// the next field, or the top 16 move into the playoff bracket.
fn advance_from_swiss(
    t: &mut Tournament,
    key: StageKey,
    qualifiers: Vec<TeamId>,
    rng: &mut impl Rng,
) -> Result<Phase, EngineError> {
    match key {
        StageKey::Stage1 => {
            let mut field = qualifiers;
            field.extend(t.stage2_seeds.iter().cloned());
            t.stage2 = Some(swiss::build_stage(StageKey::Stage2, &field, rng)?);
            t.phase = Phase::Stage2;
        }
        StageKey::Stage2 => {
            let mut field = qualifiers;
            field.extend(t.stage3_seeds.iter().cloned());
            t.stage3 = Some(swiss::build_stage(StageKey::Stage3, &field, rng)?);
            t.phase = Phase::Stage3;
        }
        StageKey::Stage3 => {
            t.playoffs = Some(playoffs::build_bracket(&qualifiers, rng)?);
            t.phase = Phase::Playoffs;
        }
    }
    log::info!("swiss stage finished, phase is now {:?}", t.phase);
    Ok(t.phase)
}

fn record_placings(placings: &mut Placings, pl: &FinalPlacements) {
    placings.entry(pl.winner.clone()).or_default().first += 1;
    placings.entry(pl.runner_up.clone()).or_default().second += 1;
    placings.entry(pl.third.clone()).or_default().third += 1;
}

/// Every match currently open for play, in board order.
pub fn available_matches(t: &Tournament) -> Vec<MatchRef> {
    let mut out = Vec::new();
    match t.phase {
        Phase::Stage1 | Phase::Stage2 | Phase::Stage3 => {
            if let (Some(key), Some(stage)) = (t.phase.stage_key(), t.current_stage()) {
                for net in &stage.nets {
                    for m in &net.matches {
                        if swiss::match_available(stage, m.id).is_ok() {
                            out.push(MatchRef::Swiss {
                                stage: key,
                                match_id: m.id,
                            });
                        }
                    }
                }
            }
        }
        Phase::Playoffs => {
            if let Some(bracket) = &t.playoffs {
                for round in PlayoffRound::ALL {
                    for m in bracket.round(round) {
                        if playoffs::can_open_match(bracket, m.id).is_ok() {
                            out.push(MatchRef::Playoff {
                                round,
                                match_id: m.id,
                            });
                        }
                    }
                }
            }
        }
        Phase::Completed => {}
    }
    out
}
