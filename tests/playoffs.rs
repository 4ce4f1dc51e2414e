//! Integration tests for the playoff bracket: seeding, winner/loser
//! propagation and the final placements.

use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;
use tourney_sim_web::logic::playoffs;
use tourney_sim_web::{EngineError, FinalPlacements, PlayoffRound, PlayoffsBracket, TeamId};

fn rng() -> StdRng {
    StdRng::seed_from_u64(11)
}

fn ids(n: usize) -> Vec<TeamId> {
    (1..=n).map(|i| format!("q{i:02}")).collect()
}

fn bracket() -> PlayoffsBracket {
    playoffs::build_bracket(&ids(16), &mut rng()).unwrap()
}

/// Resolve one match with slot A winning by the given score; returns the
/// winner and, for the grand final, the placements.
fn resolve_slot_a(
    b: &mut PlayoffsBracket,
    round: PlayoffRound,
    idx: usize,
    score: (u8, u8),
) -> (TeamId, Option<FinalPlacements>) {
    let (mid, winner) = {
        let m = &b.round(round)[idx];
        (m.id, m.slot_a.clone().unwrap())
    };
    let placements = playoffs::resolve_match(b, mid, &winner, score.0, score.1, vec![]).unwrap();
    (winner, placements)
}

#[test]
fn build_rejects_fewer_than_sixteen() {
    let err = playoffs::build_bracket(&ids(8), &mut rng()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotEnoughTeams {
            needed: 16,
            have: 8
        }
    ));
}

#[test]
fn build_pairs_sixteen_into_eight_openers() {
    let b = bracket();
    assert_eq!(b.ro16.len(), 8);

    let mut seen: HashSet<TeamId> = HashSet::new();
    for m in &b.ro16 {
        assert!(seen.insert(m.slot_a.clone().unwrap()));
        assert!(seen.insert(m.slot_b.clone().unwrap()));
    }
    assert_eq!(seen.len(), 16);

    assert_eq!(b.quarterfinals.len(), 4);
    assert_eq!(b.semifinals.len(), 2);
    assert_eq!(b.third_place.len(), 1);
    assert_eq!(b.grand_final.len(), 1);
    for round in [
        PlayoffRound::Quarterfinal,
        PlayoffRound::Semifinal,
        PlayoffRound::ThirdPlace,
        PlayoffRound::GrandFinal,
    ] {
        assert!(b
            .round(round)
            .iter()
            .all(|m| m.slot_a.is_none() && m.slot_b.is_none()));
    }
}

#[test]
fn build_truncates_extra_qualifiers() {
    let b = playoffs::build_bracket(&ids(20), &mut rng()).unwrap();
    let entered: HashSet<TeamId> = b
        .ro16
        .iter()
        .flat_map(|m| [m.slot_a.clone().unwrap(), m.slot_b.clone().unwrap()])
        .collect();
    assert_eq!(entered.len(), 16);
    // only the first sixteen by qualification order enter
    for id in entered {
        assert!(ids(16).contains(&id));
    }
}

#[test]
fn winners_feed_the_next_round_in_pairs() {
    let mut b = bracket();
    let (w0, _) = resolve_slot_a(&mut b, PlayoffRound::Ro16, 0, (2, 0));
    let (w1, _) = resolve_slot_a(&mut b, PlayoffRound::Ro16, 1, (2, 1));

    let qf0 = &b.quarterfinals[0];
    assert_eq!(qf0.slot_a.as_ref(), Some(&w0));
    assert_eq!(qf0.slot_b.as_ref(), Some(&w1));
    assert!(b.quarterfinals[1].slot_a.is_none());
}

#[test]
fn rounds_wait_for_their_feeders() {
    let mut b = bracket();

    // in-round order: the second opener waits for the first
    let second = b.ro16[1].id;
    assert!(playoffs::can_open_match(&b, b.ro16[0].id).is_ok());
    assert!(matches!(
        playoffs::can_open_match(&b, second),
        Err(EngineError::MatchLocked)
    ));

    for i in 0..2 {
        resolve_slot_a(&mut b, PlayoffRound::Ro16, i, (2, 0));
    }
    // both slots of QF0 are filled, but the feeder round is not done
    let qf0 = b.quarterfinals[0].id;
    assert!(b.quarterfinals[0].slot_a.is_some());
    assert!(matches!(
        playoffs::can_open_match(&b, qf0),
        Err(EngineError::MatchLocked)
    ));

    for i in 2..8 {
        resolve_slot_a(&mut b, PlayoffRound::Ro16, i, (2, 0));
    }
    assert!(playoffs::can_open_match(&b, qf0).is_ok());
    assert!(matches!(
        playoffs::can_open_match(&b, b.quarterfinals[1].id),
        Err(EngineError::MatchLocked)
    ));
}

#[test]
fn resolve_rejects_a_second_result() {
    let mut b = bracket();
    let (w, _) = resolve_slot_a(&mut b, PlayoffRound::Ro16, 0, (2, 1));
    let mid = b.ro16[0].id;
    assert!(matches!(
        playoffs::resolve_match(&mut b, mid, &w, 2, 1, vec![]),
        Err(EngineError::AlreadyPlayed)
    ));
}

#[test]
fn full_bracket_produces_the_podium() {
    let mut b = bracket();
    for i in 0..8 {
        resolve_slot_a(&mut b, PlayoffRound::Ro16, i, (2, 0));
    }
    for i in 0..4 {
        resolve_slot_a(&mut b, PlayoffRound::Quarterfinal, i, (3, 1));
    }

    // semifinal losers drop into the third place match
    let sf_losers: Vec<TeamId> = (0..2)
        .map(|i| b.semifinals[i].slot_b.clone().unwrap())
        .collect();
    let (sf_w0, _) = resolve_slot_a(&mut b, PlayoffRound::Semifinal, 0, (4, 2));
    let (sf_w1, _) = resolve_slot_a(&mut b, PlayoffRound::Semifinal, 1, (4, 0));

    let third = &b.third_place[0];
    assert_eq!(third.slot_a.as_ref(), Some(&sf_losers[0]));
    assert_eq!(third.slot_b.as_ref(), Some(&sf_losers[1]));

    let gf = &b.grand_final[0];
    assert_eq!(gf.slot_a.as_ref(), Some(&sf_w0));
    assert_eq!(gf.slot_b.as_ref(), Some(&sf_w1));

    // the grand final waits for the third place match even with full slots
    let gf_id = gf.id;
    assert!(matches!(
        playoffs::can_open_match(&b, gf_id),
        Err(EngineError::MatchLocked)
    ));

    let (third_winner, none) = resolve_slot_a(&mut b, PlayoffRound::ThirdPlace, 0, (4, 3));
    assert!(none.is_none());
    assert!(playoffs::can_open_match(&b, gf_id).is_ok());

    let (champion, placements) = resolve_slot_a(&mut b, PlayoffRound::GrandFinal, 0, (5, 1));
    let p = placements.unwrap();
    assert_eq!(p.winner, champion);
    assert_eq!(p.runner_up, sf_w1);
    assert_eq!(p.third, third_winner);
    assert_eq!(p.fourth, sf_losers[1]);
    assert!(b.finished());
}
