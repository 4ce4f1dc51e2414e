//! Tournament simulator web app: library with models and engine logic.

pub mod logic;
pub mod models;

pub use logic::{
    available_matches, commit_series, create_tournament, fresh_state, gamble, load_state,
    pick_match, save_state, start_match, CommitOutcome,
};
pub use models::{
    EngineError, FinalPlacements, ForcedSign, GambleSettings, MatchId, MatchRef, Net, NetState,
    Phase, PickemLine, PickemTotals, PlacingCounts, Placings, PlayoffMatch, PlayoffRound,
    PlayoffsBracket, RatingBook, SavedState, SeriesState, SetRecord, StageKey, SwissMatch,
    SwissStage, SwissTeam, TeamCatalog, TeamId, TeamInfo, Tournament, TournamentId, ALL_NETS,
};
