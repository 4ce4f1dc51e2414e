//! Pick'em scoring: full recomputation from played, picked matches.

use crate::models::{
    PickemLine, PickemTotals, PlayoffMatch, StageKey, SwissMatch, SwissStage, Tournament,
};

/// Sets the picked team took, given slot-oriented scores.
fn sets_for_pick(pick: &str, slot_a: Option<&str>, score_a: u8, score_b: u8) -> u8 {
    if slot_a == Some(pick) {
        score_a
    } else {
        score_b
    }
}

/// Points for one played Swiss match: BO1 pays 1 for a correct pick; BO3
/// pays 3, or a consolation 2 when the wrong pick still took a set.
fn swiss_points(m: &SwissMatch) -> Option<(u32, bool)> {
    if !m.played {
        return None;
    }
    let pick = m.pick.as_deref()?;
    let winner = m.winner.as_deref()?;
    let correct = pick == winner;

    let points = if m.net.best_of() == 1 {
        if correct {
            1
        } else {
            0
        }
    } else if correct {
        3
    } else if sets_for_pick(pick, m.slot_a.as_deref(), m.score_a, m.score_b) >= 1 {
        2
    } else {
        0
    };
    Some((points, correct))
}

/// Points for one played bracket match. The base equals the round's
/// best-of; a wrong pick earns two points per set its team took.
fn playoff_points(m: &PlayoffMatch) -> Option<(u32, bool)> {
    if !m.played {
        return None;
    }
    let pick = m.pick.as_deref()?;
    let winner = m.winner.as_deref()?;
    let correct = pick == winner;

    let points = if correct {
        m.round.best_of() as u32
    } else {
        2 * sets_for_pick(pick, m.slot_a.as_deref(), m.score_a, m.score_b) as u32
    };
    Some((points, correct))
}

fn stage_line(stage: Option<&SwissStage>) -> PickemLine {
    let mut line = PickemLine::default();
    if let Some(stage) = stage {
        for net in &stage.nets {
            for m in &net.matches {
                if let Some((points, correct)) = swiss_points(m) {
                    line.points += points;
                    if correct {
                        line.correct += 1;
                    }
                }
            }
        }
    }
    line
}

/// Recompute the full pick'em tally from scratch. Unpicked and unplayed
/// matches (byes included) contribute nothing; safe after every commit.
pub fn recompute(t: &Tournament) -> PickemTotals {
    let mut totals = PickemTotals {
        stage1: stage_line(t.stage(StageKey::Stage1)),
        stage2: stage_line(t.stage(StageKey::Stage2)),
        stage3: stage_line(t.stage(StageKey::Stage3)),
        ..PickemTotals::default()
    };

    if let Some(bracket) = &t.playoffs {
        for round in crate::models::PlayoffRound::ALL {
            for m in bracket.round(round) {
                if let Some((points, correct)) = playoff_points(m) {
                    totals.playoffs.points += points;
                    if correct {
                        totals.playoffs.correct += 1;
                    }
                }
            }
        }
    }

    totals.total_points = totals.stage1.points
        + totals.stage2.points
        + totals.stage3.points
        + totals.playoffs.points;
    totals
}
