// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Application, ApplicationStatus, Coordinates, Demographics, EmployerId, InteractionCounts, Job, JobId,
    NewApplication, RankedWorker, Recommendation, RecommendationParams, Worker, WorkerId,
};
pub use requests::{RecommendRequest, RecordApplicationRequest, ScoreQuery};
pub use responses::{ErrorResponse, HealthResponse, RecommendResponse, RecordApplicationResponse, ScoreResponse};
