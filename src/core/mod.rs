// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod recommender;
pub mod scoring;

pub use distance::{distance_km, haversine_distance};
pub use filters::{filter_by_radius, rank_by_threshold, relaxed_threshold, select_candidates, within_radius, Selection};
pub use recommender::{RecommendError, Recommender};
pub use scoring::{experience_score, similarity, ScoreBreakdown, ScoringEngine, ScoringOptions};
