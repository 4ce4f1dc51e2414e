//! The gamble-driven series machine: minis, rounds, sets, overtime.

use crate::models::{ForcedSign, GambleSettings, MatchRef, SeriesState, SetRecord, TeamId};
use rand::Rng;

/// Mini-wins that take a round.
const MINIS_TO_WIN: u8 = 5;
/// Round-wins that take a regulation set.
const ROUNDS_TO_WIN: u8 = 13;
/// A set resolves at this many regulation rounds; 12-12 goes to overtime.
const MAX_REGULATION_ROUNDS: u8 = 24;
/// Overtime round-wins that take the set.
const OT_ROUNDS_TO_WIN: u8 = 4;
/// An overtime block ties at 3-3 and restarts.
const OT_TIE: u8 = 3;

/// Fresh live series for a match. The picked team always plays "left" and
/// every counter counts for it.
pub fn start_series(source: MatchRef, pick: TeamId, opponent: TeamId, best_of: u8) -> SeriesState {
    SeriesState {
        active: true,
        source: Some(source),
        left_team: Some(pick),
        right_team: Some(opponent),
        best_of,
        sets_to_win: best_of / 2 + 1,
        set_number: 1,
        ..SeriesState::idle()
    }
}

/// Draw the gamble multiplier: uniform over [-2, 2], rounded to two
/// decimals. A forced sign keeps a real magnitude draw but pins the
/// direction (and never lands on zero).
pub fn draw_multiplier(rng: &mut impl Rng, settings: &GambleSettings) -> f64 {
    let raw: f64 = match settings.force {
        None => rng.gen_range(-2.0..=2.0),
        Some(ForcedSign::Positive) => rng.gen_range(0.01..=2.0),
        Some(ForcedSign::Negative) => -rng.gen_range(0.01..=2.0),
    };
    (raw * 100.0).round() / 100.0
}

/// Apply one multiplier to the series (functional update; the input state
/// is left untouched).
///
/// 1. The sign awards a mini: positive → left (the pick), negative →
///    right, zero → nothing happens.
/// 2. Five minis take the round; 4-4 just keeps going.
/// 3. The round feeds regulation or overtime scoring, which may finish the
///    set and with it the series.
pub fn apply_gamble(state: &SeriesState, multiplier: f64) -> SeriesState {
    let mut s = state.clone();
    if !s.active || s.finished() {
        return s;
    }

    if multiplier > 0.0 {
        s.mini_wins += 1;
    } else if multiplier < 0.0 {
        s.mini_losses += 1;
    } else {
        return s;
    }
    if s.mini_wins < MINIS_TO_WIN && s.mini_losses < MINIS_TO_WIN {
        return s;
    }

    let left_took_round = s.mini_wins >= MINIS_TO_WIN;
    s.mini_wins = 0;
    s.mini_losses = 0;
    if s.is_overtime {
        resolve_overtime_round(&mut s, left_took_round);
    } else {
        resolve_regulation_round(&mut s, left_took_round);
    }
    s
}

/// First to 13 rounds takes the set. A set that reaches 24 rounds goes to
/// the leader, except a 12-12 tie which opens overtime.
fn resolve_regulation_round(s: &mut SeriesState, left_won: bool) {
    s.round_number += 1;
    if left_won {
        s.round_wins += 1;
    } else {
        s.round_losses += 1;
    }

    if s.round_wins >= ROUNDS_TO_WIN {
        complete_set(s, true);
    } else if s.round_losses >= ROUNDS_TO_WIN {
        complete_set(s, false);
    } else if s.round_number >= MAX_REGULATION_ROUNDS {
        if s.round_wins == s.round_losses {
            s.is_overtime = true;
            s.overtime_block = 1;
            s.ot_wins = 0;
            s.ot_losses = 0;
        } else {
            complete_set(s, s.round_wins > s.round_losses);
        }
    }
}

/// First to 4 overtime rounds takes the set; a 3-3 block ties and restarts
/// with fresh counters.
fn resolve_overtime_round(s: &mut SeriesState, left_won: bool) {
    if left_won {
        s.ot_wins += 1;
    } else {
        s.ot_losses += 1;
    }

    if s.ot_wins >= OT_ROUNDS_TO_WIN {
        complete_set(s, true);
    } else if s.ot_losses >= OT_ROUNDS_TO_WIN {
        complete_set(s, false);
    } else if s.ot_wins == OT_TIE && s.ot_losses == OT_TIE {
        s.overtime_block += 1;
        s.ot_wins = 0;
        s.ot_losses = 0;
    }
}

/// Close the current set: record its scoreline, then either open the next
/// set or end the series with a banner.
fn complete_set(s: &mut SeriesState, left_won: bool) {
    let (wins, losses) = s.current_set_score();
    s.set_history.push(SetRecord {
        set: s.set_number,
        wins,
        losses,
        won: left_won,
    });
    if left_won {
        s.sets_won += 1;
    } else {
        s.sets_lost += 1;
    }

    s.round_wins = 0;
    s.round_losses = 0;
    s.round_number = 0;
    s.mini_wins = 0;
    s.mini_losses = 0;
    s.is_overtime = false;
    s.overtime_block = 0;
    s.ot_wins = 0;
    s.ot_losses = 0;

    if s.sets_won >= s.sets_to_win {
        s.banner = banner_for(s, true);
    } else if s.sets_lost >= s.sets_to_win {
        s.banner = banner_for(s, false);
    } else {
        s.set_number += 1;
    }
}

fn banner_for(s: &SeriesState, left_won: bool) -> String {
    let team = if left_won { &s.left_team } else { &s.right_team };
    let name = team.as_deref().unwrap_or("?");
    let (w, l) = if left_won {
        (s.sets_won, s.sets_lost)
    } else {
        (s.sets_lost, s.sets_won)
    };
    format!("{} wins the series {}:{}", name, w, l)
}

/// The final sets score oriented to the given slot A team.
pub fn slot_scores(s: &SeriesState, slot_a: &str) -> (u8, u8) {
    if s.left_team.as_deref() == Some(slot_a) {
        (s.sets_won, s.sets_lost)
    } else {
        (s.sets_lost, s.sets_won)
    }
}
