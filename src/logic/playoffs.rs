//! Playoff bracket engine: building, opening gates, winner propagation.

use crate::models::{
    EngineError, FinalPlacements, MatchId, PlayoffMatch, PlayoffRound, PlayoffsBracket, SetRecord,
    TeamId,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Build the 16-team bracket: shuffle the field, pair it into the round of
/// 16, and leave every later slot empty until results propagate into it.
/// A longer field is truncated to its first 16 entries.
pub fn build_bracket(field: &[TeamId], rng: &mut impl Rng) -> Result<PlayoffsBracket, EngineError> {
    if field.len() < 16 {
        return Err(EngineError::NotEnoughTeams {
            needed: 16,
            have: field.len(),
        });
    }
    let mut pool: Vec<TeamId> = field[..16].to_vec();
    pool.shuffle(rng);

    let ro16 = pool
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            PlayoffMatch::new(
                PlayoffRound::Ro16,
                i as u32,
                Some(pair[0].clone()),
                Some(pair[1].clone()),
            )
        })
        .collect();

    let empty_round = |round: PlayoffRound| {
        (0..round.match_count())
            .map(|i| PlayoffMatch::new(round, i as u32, None, None))
            .collect()
    };

    Ok(PlayoffsBracket {
        ro16,
        quarterfinals: empty_round(PlayoffRound::Quarterfinal),
        semifinals: empty_round(PlayoffRound::Semifinal),
        third_place: empty_round(PlayoffRound::ThirdPlace),
        grand_final: empty_round(PlayoffRound::GrandFinal),
    })
}

/// Rounds that must be fully played before a match of `round` can open.
fn feeder_rounds(round: PlayoffRound) -> &'static [PlayoffRound] {
    match round {
        PlayoffRound::Ro16 => &[],
        PlayoffRound::Quarterfinal => &[PlayoffRound::Ro16],
        PlayoffRound::Semifinal => &[PlayoffRound::Quarterfinal],
        PlayoffRound::ThirdPlace => &[PlayoffRound::Semifinal],
        PlayoffRound::GrandFinal => &[PlayoffRound::Semifinal, PlayoffRound::ThirdPlace],
    }
}

/// A bracket match opens when both slots are decided, it has no result,
/// every earlier match of its round is played, and its feeding rounds are
/// complete (the grand final additionally waits for the third place
/// decider).
pub fn can_open_match(bracket: &PlayoffsBracket, match_id: MatchId) -> Result<(), EngineError> {
    let (round, mi) = bracket
        .find_match(match_id)
        .ok_or(EngineError::MatchNotFound)?;
    let m = &bracket.round(round)[mi];
    if m.played {
        return Err(EngineError::AlreadyPlayed);
    }
    if m.slot_a.is_none() || m.slot_b.is_none() {
        return Err(EngineError::MatchLocked);
    }
    if bracket.round(round)[..mi].iter().any(|prev| !prev.played) {
        return Err(EngineError::MatchLocked);
    }
    if feeder_rounds(round)
        .iter()
        .any(|&r| !bracket.round_finished(r))
    {
        return Err(EngineError::MatchLocked);
    }
    Ok(())
}

/// Picking a bracket match only needs both teams known and no result yet.
pub fn pick_allowed(bracket: &PlayoffsBracket, match_id: MatchId) -> Result<(), EngineError> {
    let (round, mi) = bracket
        .find_match(match_id)
        .ok_or(EngineError::MatchNotFound)?;
    let m = &bracket.round(round)[mi];
    if m.played {
        return Err(EngineError::AlreadyPlayed);
    }
    if m.slot_a.is_none() || m.slot_b.is_none() {
        return Err(EngineError::MatchLocked);
    }
    Ok(())
}

/// Write a finished series into its bracket match and propagate the winner
/// into the next round. Semifinal losers drop into the third place match;
/// the grand final returns the tournament's final placements.
pub fn resolve_match(
    bracket: &mut PlayoffsBracket,
    match_id: MatchId,
    winner_id: &str,
    score_a: u8,
    score_b: u8,
    set_history: Vec<SetRecord>,
) -> Result<Option<FinalPlacements>, EngineError> {
    let (round, mi) = bracket
        .find_match(match_id)
        .ok_or(EngineError::MatchNotFound)?;

    let loser_id = {
        let m = &bracket.round(round)[mi];
        if m.played {
            return Err(EngineError::AlreadyPlayed);
        }
        if !m.has_team(winner_id) {
            return Err(EngineError::TeamNotInMatch(winner_id.to_string()));
        }
        m.opponent_of(winner_id)
            .cloned()
            .ok_or(EngineError::MissingOpponent)?
    };

    {
        let m = &mut bracket.round_mut(round)[mi];
        m.played = true;
        m.score_a = score_a;
        m.score_b = score_b;
        m.winner = Some(winner_id.to_string());
        m.set_history = set_history;
    }

    match round {
        PlayoffRound::Ro16 => {
            feed_slot(bracket, PlayoffRound::Quarterfinal, mi, winner_id);
        }
        PlayoffRound::Quarterfinal => {
            feed_slot(bracket, PlayoffRound::Semifinal, mi, winner_id);
        }
        PlayoffRound::Semifinal => {
            feed_slot(bracket, PlayoffRound::GrandFinal, mi, winner_id);
            feed_slot(bracket, PlayoffRound::ThirdPlace, mi, &loser_id);
        }
        PlayoffRound::ThirdPlace => {}
        PlayoffRound::GrandFinal => {
            let third_match = &bracket.third_place[0];
            let third = third_match
                .winner
                .clone()
                .ok_or(EngineError::MatchLocked)?;
            let fourth = third_match
                .opponent_of(&third)
                .cloned()
                .ok_or(EngineError::MatchLocked)?;
            return Ok(Some(FinalPlacements {
                winner: winner_id.to_string(),
                runner_up: loser_id,
                third,
                fourth,
            }));
        }
    }
    Ok(None)
}

/// Put a team into the next round: match `mi` feeds match `mi / 2`, slot A
/// on even index and slot B on odd.
fn feed_slot(bracket: &mut PlayoffsBracket, round: PlayoffRound, mi: usize, team_id: &str) {
    let target = mi / 2;
    if let Some(m) = bracket.round_mut(round).get_mut(target) {
        if mi % 2 == 0 {
            m.slot_a = Some(team_id.to_string());
        } else {
            m.slot_b = Some(team_id.to_string());
        }
    }
}
