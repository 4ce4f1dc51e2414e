//! Data structures for the tournament simulator: teams, stages, series, state.

mod playoffs;
mod series;
mod swiss;
mod team;
mod tournament;

pub use playoffs::{FinalPlacements, PlayoffMatch, PlayoffRound, PlayoffsBracket};
pub use series::{ForcedSign, GambleSettings, MatchRef, SeriesState, SetRecord};
pub use swiss::{MatchId, Net, NetState, StageKey, SwissMatch, SwissStage, SwissTeam, ALL_NETS};
pub use team::{PlacingCounts, Placings, RatingBook, TeamCatalog, TeamId, TeamInfo, TEAMS_CSV};
pub use tournament::{
    EngineError, Phase, PickemLine, PickemTotals, SavedState, Tournament, TournamentId,
};
