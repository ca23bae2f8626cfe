//! Jobcast - worker recommendation service for field job postings
//!
//! Ranks registered field workers for a newly posted job: a radius hard
//! filter, a four-signal score built from application history, and a
//! selection policy that relaxes its threshold when too few workers qualify.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{distance::{distance_km, haversine_distance}, RecommendError, Recommender, ScoringEngine, ScoringOptions};
pub use models::{Job, RankedWorker, Recommendation, RecommendationParams, Worker};
pub use services::{InMemoryRepository, WorkerRepository};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let distance = haversine_distance(31.87, -116.61, 31.87, -116.61);
        assert!(distance < 0.001);
        assert_eq!(RecommendationParams::default().threshold, 50);
    }
}
