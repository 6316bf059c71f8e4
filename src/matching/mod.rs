pub mod compatibility;
mod engine;
pub mod models;
mod sqlite_store;
mod store;

pub use compatibility::compute_compatibility;
pub use engine::MatchEngine;
pub use models::{
    CandidateFilters, Match, MatchingConfig, ScoreResult, ScoredCandidate, Swipe, SwipeAction,
    SwipeOutcome,
};
pub use sqlite_store::SqliteMatchStore;
pub use store::MatchStore;
