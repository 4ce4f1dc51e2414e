//! End-to-end tests: tournament creation, the pick/start/gamble/commit
//! cycle, phase advancement and snapshot persistence.

use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;
use tourney_sim_web::logic::store;
use tourney_sim_web::{
    available_matches, commit_series, create_tournament, fresh_state, gamble, pick_match,
    start_match, EngineError, ForcedSign, GambleSettings, MatchRef, Net, Phase, SavedState,
    StageKey, TeamCatalog, Tournament,
};

fn rng() -> StdRng {
    StdRng::seed_from_u64(21)
}

fn setup() -> (TeamCatalog, SavedState) {
    let catalog = TeamCatalog::embedded().unwrap();
    let state = fresh_state(&catalog);
    (catalog, state)
}

fn slots_of(t: &Tournament, r: &MatchRef) -> (String, String) {
    match r {
        MatchRef::Swiss { stage, match_id } => {
            let s = t.stage(*stage).unwrap();
            let (ni, mi) = s.find_match(*match_id).unwrap();
            let m = &s.nets[ni].matches[mi];
            (m.slot_a.clone().unwrap(), m.slot_b.clone().unwrap())
        }
        MatchRef::Playoff { match_id, .. } => {
            let b = t.playoffs.as_ref().unwrap();
            let (round, mi) = b.find_match(*match_id).unwrap();
            let m = &b.round(round)[mi];
            (m.slot_a.clone().unwrap(), m.slot_b.clone().unwrap())
        }
    }
}

/// Gamble with a pinned positive sign until the pick has the series.
fn run_series(t: &mut Tournament, r: &mut StdRng) {
    let settings = GambleSettings {
        force: Some(ForcedSign::Positive),
    };
    for _ in 0..100_000 {
        if t.series.finished() {
            return;
        }
        gamble(t, r, &settings).unwrap();
    }
    panic!("series did not finish");
}

#[test]
fn embedded_catalog_has_the_full_field() {
    let catalog = TeamCatalog::embedded().unwrap();
    assert_eq!(catalog.len(), 64);
}

#[test]
fn creation_reserves_seeds_by_leaderboard_quarters() {
    let (catalog, state) = setup();
    let t = create_tournament(&catalog, &state.ratings, &mut rng()).unwrap();

    assert_eq!(t.phase, Phase::Stage1);
    assert_eq!(t.stage3_seeds.len(), 16);
    assert_eq!(t.stage2_seeds.len(), 16);

    let stage1 = t.stage1.as_ref().unwrap();
    assert_eq!(stage1.teams.len(), 32);
    assert_eq!(
        stage1.net_state(Net::new(0, 0)).unwrap().matches.len(),
        16
    );

    // with the default book the quarters fall along the default ratings
    for id in &t.stage3_seeds {
        assert_eq!(state.ratings[id], 100);
    }
    for id in &t.stage2_seeds {
        assert_eq!(state.ratings[id], 75);
    }
    for team in &stage1.teams {
        assert_eq!(state.ratings[&team.team_id], 50);
    }
}

#[test]
fn start_needs_a_pick_first() {
    let (catalog, state) = setup();
    let mut t = create_tournament(&catalog, &state.ratings, &mut rng()).unwrap();
    let first = available_matches(&t)[0].clone();
    assert!(matches!(
        start_match(&mut t, &first),
        Err(EngineError::PickMissing)
    ));
}

#[test]
fn the_live_match_blocks_repicks_and_restarts() {
    let (catalog, state) = setup();
    let mut r = rng();
    let mut t = create_tournament(&catalog, &state.ratings, &mut r).unwrap();

    let first = available_matches(&t)[0].clone();
    let (a, _) = slots_of(&t, &first);
    pick_match(&mut t, &first, &a).unwrap();
    start_match(&mut t, &first).unwrap();

    assert!(matches!(
        pick_match(&mut t, &first, &a),
        Err(EngineError::SeriesActive)
    ));
    assert!(matches!(
        start_match(&mut t, &first),
        Err(EngineError::SeriesActive)
    ));

    // picking a different, idle match is still allowed, even one that has
    // not been revealed for play yet
    let hidden = t.stage1.as_ref().unwrap().net_state(Net::new(0, 0)).unwrap().matches[1].clone();
    let second = MatchRef::Swiss {
        stage: StageKey::Stage1,
        match_id: hidden.id,
    };
    pick_match(&mut t, &second, hidden.slot_a.as_deref().unwrap()).unwrap();
}

#[test]
fn gambling_needs_a_live_unfinished_series() {
    let (catalog, mut state) = setup();
    let mut r = rng();
    let mut t = create_tournament(&catalog, &state.ratings, &mut r).unwrap();
    let settings = GambleSettings::default();

    assert!(matches!(
        gamble(&mut t, &mut r, &settings),
        Err(EngineError::SeriesNotActive)
    ));

    let first = available_matches(&t)[0].clone();
    let (a, _) = slots_of(&t, &first);
    pick_match(&mut t, &first, &a).unwrap();
    start_match(&mut t, &first).unwrap();
    assert!(matches!(
        commit_series(&mut t, &mut state.ratings, &mut state.placings, &catalog, &mut r),
        Err(EngineError::SeriesUnfinished)
    ));

    run_series(&mut t, &mut r);
    assert!(matches!(
        gamble(&mut t, &mut r, &settings),
        Err(EngineError::SeriesFinished)
    ));
}

#[test]
fn a_committed_swiss_win_moves_ratings_and_pickem() {
    let (catalog, mut state) = setup();
    let mut r = rng();
    let mut t = create_tournament(&catalog, &state.ratings, &mut r).unwrap();

    let first = available_matches(&t)[0].clone();
    let (a, b) = slots_of(&t, &first);
    pick_match(&mut t, &first, &a).unwrap();
    start_match(&mut t, &first).unwrap();
    run_series(&mut t, &mut r);

    let outcome =
        commit_series(&mut t, &mut state.ratings, &mut state.placings, &catalog, &mut r).unwrap();

    // stage one opener is BO1 between two 50-point teams: +3 / -2
    assert_eq!(outcome.winner, a);
    assert_eq!(outcome.loser, b);
    assert_eq!((outcome.score_a, outcome.score_b), (1, 0));
    assert_eq!(state.ratings[&a], 53);
    assert_eq!(state.ratings[&b], 48);
    assert_eq!(outcome.rating.winner.points_after, 53);
    assert_eq!(outcome.advanced_to, None);
    assert!(outcome.placements.is_none());

    assert_eq!(t.pickem.stage1.points, 1);
    assert_eq!(t.pickem.stage1.correct, 1);
    assert!(!t.series.active);

    let stage1 = t.stage1.as_ref().unwrap();
    let winner = stage1.team(&a).unwrap();
    assert_eq!((winner.wins, winner.losses), (1, 0));
}

#[test]
fn full_tournament_reaches_placements() {
    let (catalog, mut state) = setup();
    let mut r = rng();
    let mut t = create_tournament(&catalog, &state.ratings, &mut r).unwrap();

    let mut commits = 0;
    let mut transitions = Vec::new();
    while t.phase != Phase::Completed {
        let open = available_matches(&t);
        let m = open
            .first()
            .expect("no open match in a running tournament")
            .clone();
        let (a, _) = slots_of(&t, &m);
        pick_match(&mut t, &m, &a).unwrap();
        start_match(&mut t, &m).unwrap();
        run_series(&mut t, &mut r);
        let outcome =
            commit_series(&mut t, &mut state.ratings, &mut state.placings, &catalog, &mut r)
                .unwrap();
        if let Some(phase) = outcome.advanced_to {
            transitions.push(phase);
        }
        commits += 1;
        assert!(commits <= 250, "tournament did not terminate");
    }

    // three 32-team stages of 66 matches each plus a 16-team bracket
    assert_eq!(commits, 214);
    assert_eq!(
        transitions,
        vec![Phase::Stage2, Phase::Stage3, Phase::Playoffs, Phase::Completed]
    );

    let p = t.placements.clone().unwrap();
    let podium: HashSet<_> = [&p.winner, &p.runner_up, &p.third, &p.fourth]
        .into_iter()
        .collect();
    assert_eq!(podium.len(), 4);
    assert_eq!(state.placings[&p.winner].first, 1);
    assert_eq!(state.placings[&p.runner_up].second, 1);
    assert_eq!(state.placings[&p.third].third, 1);
    assert!(available_matches(&t).is_empty());

    // every pick won: 40 BO1 + 26 BO3 matches per stage, then the bracket
    assert_eq!(t.pickem.stage1.correct, 66);
    assert_eq!(t.pickem.stage1.points, 118);
    assert_eq!(t.pickem.total_points, 3 * 118 + 74);

    // the delta table pays winners more than it takes from losers
    let total: u32 = state.ratings.values().sum();
    assert!(total > 4400); // 16*100 + 16*75 + 32*50
}

#[test]
fn snapshot_round_trip_is_identity() {
    let (catalog, mut state) = setup();
    let mut r = rng();
    let mut t = create_tournament(&catalog, &state.ratings, &mut r).unwrap();

    // play two matches, then freeze a third mid-series
    for _ in 0..2 {
        let m = available_matches(&t)[0].clone();
        let (a, _) = slots_of(&t, &m);
        pick_match(&mut t, &m, &a).unwrap();
        start_match(&mut t, &m).unwrap();
        run_series(&mut t, &mut r);
        commit_series(&mut t, &mut state.ratings, &mut state.placings, &catalog, &mut r).unwrap();
    }
    let m = available_matches(&t)[0].clone();
    let (a, _) = slots_of(&t, &m);
    pick_match(&mut t, &m, &a).unwrap();
    start_match(&mut t, &m).unwrap();
    for _ in 0..7 {
        gamble(&mut t, &mut r, &GambleSettings::default()).unwrap();
    }

    state.tournament = Some(t);
    let json = serde_json::to_string(&state).unwrap();
    let back: SavedState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
}

#[test]
fn snapshots_survive_a_save_and_load() {
    let (catalog, mut state) = setup();
    state.ratings.insert("iron-wolves".into(), 123);

    let path = std::env::temp_dir().join(format!("tourney-sim-test-{}.json", uuid::Uuid::new_v4()));
    store::save_state(&path, &state).unwrap();
    let loaded = store::load_state(&path, &catalog);
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.ratings, state.ratings);
    assert_eq!(loaded.placings, state.placings);
    assert_eq!(loaded.tournament, state.tournament);
}

#[test]
fn a_missing_snapshot_file_yields_a_fresh_book() {
    let catalog = TeamCatalog::embedded().unwrap();
    let path =
        std::env::temp_dir().join(format!("tourney-sim-absent-{}.json", uuid::Uuid::new_v4()));
    let state = store::load_state(&path, &catalog);

    assert!(state.tournament.is_none());
    assert_eq!(state.ratings.len(), 64);
    assert_eq!(state.ratings["iron-wolves"], 100);
}
