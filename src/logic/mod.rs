//! Engine operations: free functions over the models.

pub mod leaderboard;
pub mod orchestrator;
pub mod pickem;
pub mod playoffs;
pub mod rating;
pub mod series;
pub mod store;
pub mod swiss;

pub use orchestrator::{
    available_matches, commit_series, create_tournament, gamble, pick_match, start_match,
    CommitOutcome,
};
pub use store::{fresh_state, load_state, save_state};
