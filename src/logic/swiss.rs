//! Swiss bracket engine: stage building, net unlocking, match resolution.

use crate::models::{
    EngineError, MatchId, Net, SetRecord, StageKey, SwissMatch, SwissStage, SwissTeam, TeamId,
    ALL_NETS,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Build a fresh stage: every team enters at 0:0 and only the 0:0 net is
/// paired. Later nets build themselves as their columns unlock.
pub fn build_stage(
    key: StageKey,
    team_ids: &[TeamId],
    rng: &mut impl Rng,
) -> Result<SwissStage, EngineError> {
    if team_ids.len() < 2 {
        return Err(EngineError::NotEnoughTeams {
            needed: 2,
            have: team_ids.len(),
        });
    }
    let teams = team_ids.iter().cloned().map(SwissTeam::new).collect();
    let mut stage = SwissStage::new(key, teams);
    build_unlocked_nets(&mut stage, rng);
    Ok(stage)
}

/// A net is unlocked when every net in the previous column is built and
/// fully played. Column 0 is always unlocked.
pub fn net_unlocked(stage: &SwissStage, net: Net) -> bool {
    let col = net.column();
    if col == 0 {
        return true;
    }
    stage
        .nets
        .iter()
        .filter(|n| n.net.column() == col - 1)
        .all(|n| n.finished())
}

/// Build every unlocked, not-yet-built net. Idempotent; called after every
/// committed result.
///
/// 1. Pool the undecided teams sitting at exactly the net's record.
/// 2. Shuffle uniformly and pair consecutively.
/// 3. An odd team out gets a bye, auto-resolved as a free win so the
///    column can still finish.
pub fn build_unlocked_nets(stage: &mut SwissStage, rng: &mut impl Rng) {
    for net in ALL_NETS {
        let already_built = stage.net_state(net).map(|n| n.built).unwrap_or(true);
        if already_built || !net_unlocked(stage, net) {
            continue;
        }

        let mut pool: Vec<TeamId> = stage
            .teams
            .iter()
            .filter(|t| !t.is_decided() && t.net() == net)
            .map(|t| t.team_id.clone())
            .collect();
        pool.shuffle(rng);

        let mut matches = Vec::new();
        let mut queue = pool.into_iter();
        let mut match_no = 0;
        while let Some(a) = queue.next() {
            matches.push(SwissMatch::new(net, match_no, Some(a), queue.next()));
            match_no += 1;
        }

        let mut bye_winners = Vec::new();
        for m in matches.iter_mut().filter(|m| m.is_bye()) {
            m.played = true;
            m.winner = m.slot_a.clone();
            m.score_a = sets_to_win(net.best_of());
            if let Some(id) = &m.winner {
                bye_winners.push(id.clone());
            }
        }

        if let Some(state) = stage.net_state_mut(net) {
            state.built = true;
            state.matches = matches;
        }
        for team_id in bye_winners {
            record_win(stage, &team_id);
        }
    }
}

/// Sets needed to take a series of the given length.
pub fn sets_to_win(best_of: u8) -> u8 {
    best_of / 2 + 1
}

/// Write a finished series result into its match and update both records.
/// Three wins qualify a team, three losses eliminate it; either way the
/// record freezes and is stamped with the stage's decision counter.
pub fn resolve_match(
    stage: &mut SwissStage,
    match_id: MatchId,
    winner_id: &str,
    score_a: u8,
    score_b: u8,
    set_history: Vec<SetRecord>,
) -> Result<(), EngineError> {
    let (ni, mi) = stage.find_match(match_id).ok_or(EngineError::MatchNotFound)?;

    let loser_id = {
        let m = &stage.nets[ni].matches[mi];
        if m.played {
            return Err(EngineError::AlreadyPlayed);
        }
        let (a, b) = match (&m.slot_a, &m.slot_b) {
            (Some(a), Some(b)) => (a.clone(), b.clone()),
            _ => return Err(EngineError::MissingOpponent),
        };
        if winner_id == a {
            b
        } else if winner_id == b {
            a
        } else {
            return Err(EngineError::TeamNotInMatch(winner_id.to_string()));
        }
    };

    let m = &mut stage.nets[ni].matches[mi];
    m.played = true;
    m.score_a = score_a;
    m.score_b = score_b;
    m.winner = Some(winner_id.to_string());
    m.set_history = set_history;

    record_win(stage, winner_id);
    record_loss(stage, &loser_id);
    Ok(())
}

fn record_win(stage: &mut SwissStage, team_id: &str) {
    let stamp = stage.decision_counter + 1;
    let mut decided = false;
    if let Some(t) = stage.team_mut(team_id) {
        t.wins += 1;
        if t.wins >= 3 && !t.is_decided() {
            t.decided_via = Some(format!("{}:{}", t.wins, t.losses));
            t.qualified_at = Some(stamp);
            decided = true;
        }
    }
    if decided {
        stage.decision_counter = stamp;
    }
}

fn record_loss(stage: &mut SwissStage, team_id: &str) {
    let stamp = stage.decision_counter + 1;
    let mut decided = false;
    if let Some(t) = stage.team_mut(team_id) {
        t.losses += 1;
        if t.losses >= 3 && !t.is_decided() {
            t.decided_via = Some(format!("{}:{}", t.wins, t.losses));
            t.eliminated_at = Some(stamp);
            decided = true;
        }
    }
    if decided {
        stage.decision_counter = stamp;
    }
}

/// A match is open for play when it has both teams, no result, and every
/// earlier match of its net already has one. Byes and unbuilt nets never
/// come up here: their matches either auto-resolved or do not exist yet.
pub fn match_available(stage: &SwissStage, match_id: MatchId) -> Result<(), EngineError> {
    let (ni, mi) = stage.find_match(match_id).ok_or(EngineError::MatchNotFound)?;
    let net_state = &stage.nets[ni];
    let m = &net_state.matches[mi];
    if m.played {
        return Err(EngineError::AlreadyPlayed);
    }
    if m.is_bye() {
        return Err(EngineError::MissingOpponent);
    }
    if net_state.matches[..mi].iter().any(|prev| !prev.played) {
        return Err(EngineError::MatchLocked);
    }
    Ok(())
}

/// Picking only needs the pairing to exist with both teams and no result;
/// a match later in its net may be picked before it opens for play.
pub fn pick_allowed(stage: &SwissStage, match_id: MatchId) -> Result<(), EngineError> {
    let (ni, mi) = stage.find_match(match_id).ok_or(EngineError::MatchNotFound)?;
    let m = &stage.nets[ni].matches[mi];
    if m.played {
        return Err(EngineError::AlreadyPlayed);
    }
    if m.is_bye() {
        return Err(EngineError::MissingOpponent);
    }
    Ok(())
}
