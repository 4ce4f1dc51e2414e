//! Integration tests for the series machine: minis, rounds, overtime and
//! the final banner.

use rand::{rngs::StdRng, SeedableRng};
use tourney_sim_web::logic::series;
use tourney_sim_web::{ForcedSign, GambleSettings, MatchRef, SeriesState, StageKey};
use uuid::Uuid;

fn swiss_ref() -> MatchRef {
    MatchRef::Swiss {
        stage: StageKey::Stage1,
        match_id: Uuid::new_v4(),
    }
}

fn series_of(best_of: u8) -> SeriesState {
    series::start_series(swiss_ref(), "alpha".into(), "beta".into(), best_of)
}

/// Feed n positive multipliers, i.e. n mini-wins for the pick.
fn win_minis(s: &SeriesState, n: usize) -> SeriesState {
    let mut cur = s.clone();
    for _ in 0..n {
        cur = series::apply_gamble(&cur, 1.0);
    }
    cur
}

#[test]
fn start_marks_the_series_live() {
    let s = series_of(3);
    assert!(s.active);
    assert!(!s.finished());
    assert_eq!(s.sets_to_win, 2);
    assert_eq!(s.set_number, 1);
    assert_eq!(s.left_team.as_deref(), Some("alpha"));
    assert_eq!(s.right_team.as_deref(), Some("beta"));
}

#[test]
fn five_mini_wins_take_a_round() {
    let s = win_minis(&series_of(3), 4);
    assert_eq!((s.round_wins, s.mini_wins), (0, 4));

    let s = series::apply_gamble(&s, 0.5);
    assert_eq!((s.round_wins, s.round_losses), (1, 0));
    assert_eq!((s.mini_wins, s.mini_losses), (0, 0));
    assert_eq!(s.round_number, 1);
}

#[test]
fn a_zero_multiplier_changes_nothing() {
    let s = win_minis(&series_of(3), 3);
    let same = series::apply_gamble(&s, 0.0);
    assert_eq!(same, s);
}

#[test]
fn negative_multipliers_count_for_the_opponent() {
    let s = series::apply_gamble(&series_of(3), -1.37);
    assert_eq!((s.mini_wins, s.mini_losses), (0, 1));

    // four-all keeps the round going until someone lands the fifth
    let mut even = series_of(3);
    even.mini_wins = 4;
    even.mini_losses = 4;
    let even = series::apply_gamble(&even, -0.2);
    assert_eq!((even.round_wins, even.round_losses), (0, 1));
    assert_eq!((even.mini_wins, even.mini_losses), (0, 0));
}

#[test]
fn a_set_ends_at_thirteen_rounds() {
    let mut s = series_of(3);
    s.round_wins = 12;
    s.round_losses = 7;
    s.round_number = 19;

    let s = win_minis(&s, 5);
    assert_eq!(s.sets_won, 1);
    assert_eq!(s.set_number, 2);
    assert_eq!((s.round_wins, s.round_losses, s.round_number), (0, 0, 0));
    assert!(!s.finished());

    assert_eq!(s.set_history.len(), 1);
    let rec = s.set_history[0];
    assert_eq!((rec.set, rec.wins, rec.losses, rec.won), (1, 13, 7, true));
}

#[test]
fn bo1_set_decides_the_series() {
    let mut s = series_of(1);
    s.round_wins = 12;
    s.round_losses = 3;

    let s = win_minis(&s, 5);
    assert!(s.finished());
    assert_eq!(s.banner, "alpha wins the series 1:0");

    // further gambles are ignored once the banner is up
    let after = series::apply_gamble(&s, 1.5);
    assert_eq!(after, s);
}

#[test]
fn twelve_twelve_goes_to_overtime() {
    let mut s = series_of(3);
    s.round_wins = 11;
    s.round_losses = 12;
    s.round_number = 23;

    let s = win_minis(&s, 5);
    assert!(s.is_overtime);
    assert_eq!(s.overtime_block, 1);
    assert_eq!((s.round_wins, s.round_losses), (12, 12));
    assert_eq!((s.ot_wins, s.ot_losses), (0, 0));
    assert_eq!(s.sets_won, 0);
}

#[test]
fn a_leader_at_twenty_four_rounds_takes_the_set() {
    let mut s = series_of(3);
    s.round_wins = 11;
    s.round_losses = 9;
    s.round_number = 23;

    let s = win_minis(&s, 5);
    assert_eq!(s.sets_won, 1);
    assert!(!s.is_overtime);
    let rec = s.set_history[0];
    assert_eq!((rec.wins, rec.losses), (12, 9));
}

#[test]
fn overtime_first_to_four_takes_the_set() {
    let mut s = series_of(1);
    s.round_wins = 12;
    s.round_losses = 12;
    s.round_number = 24;
    s.is_overtime = true;
    s.overtime_block = 1;
    s.ot_wins = 3;
    s.ot_losses = 2;

    let s = win_minis(&s, 5);
    assert!(s.finished());
    let rec = s.set_history[0];
    // regulation rounds plus the deciding overtime block
    assert_eq!((rec.wins, rec.losses), (16, 14));
    assert_eq!(s.banner, "alpha wins the series 1:0");
}

#[test]
fn tied_overtime_block_starts_the_next_one() {
    let mut s = series_of(3);
    s.round_wins = 12;
    s.round_losses = 12;
    s.round_number = 24;
    s.is_overtime = true;
    s.overtime_block = 1;
    s.ot_wins = 2;
    s.ot_losses = 3;

    let s = win_minis(&s, 5);
    assert!(s.is_overtime);
    assert_eq!(s.overtime_block, 2);
    assert_eq!((s.ot_wins, s.ot_losses), (0, 0));
    assert!(!s.finished());
}

#[test]
fn losing_two_sets_of_three_ends_it_for_the_opponent() {
    let mut s = series_of(3);
    s.sets_lost = 1;
    s.round_losses = 12;

    let mut cur = s;
    for _ in 0..5 {
        cur = series::apply_gamble(&cur, -1.0);
    }
    assert!(cur.finished());
    assert_eq!(cur.banner, "beta wins the series 2:0");
}

#[test]
fn forced_signs_pin_the_draw() {
    let mut r = StdRng::seed_from_u64(3);
    let up = GambleSettings {
        force: Some(ForcedSign::Positive),
    };
    let down = GambleSettings {
        force: Some(ForcedSign::Negative),
    };
    for _ in 0..64 {
        assert!(series::draw_multiplier(&mut r, &up) > 0.0);
        assert!(series::draw_multiplier(&mut r, &down) < 0.0);
    }
}

#[test]
fn multipliers_come_rounded_to_cents() {
    let mut r = StdRng::seed_from_u64(4);
    let settings = GambleSettings::default();
    for _ in 0..64 {
        let m = series::draw_multiplier(&mut r, &settings);
        assert!((-2.0..=2.0).contains(&m));
        let scaled = m * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }
}

#[test]
fn scores_map_back_to_slots() {
    let mut s = series_of(3);
    s.sets_won = 2;
    s.sets_lost = 1;
    assert_eq!(series::slot_scores(&s, "alpha"), (2, 1));
    assert_eq!(series::slot_scores(&s, "beta"), (1, 2));
}
