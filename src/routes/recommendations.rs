use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{distance_km, within_radius, RecommendError, Recommender};
use crate::models::{
    ApplicationStatus, ErrorResponse, HealthResponse, Job, NewApplication, RecommendRequest, RecommendResponse,
    RecommendationParams, RecordApplicationRequest, RecordApplicationResponse, ScoreQuery, ScoreResponse,
};
use crate::services::{GeocoderClient, RepositoryError, WorkerRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn WorkerRepository>,
    pub recommender: Arc<Recommender>,
    pub geocoder: Option<Arc<GeocoderClient>>,
    pub defaults: RecommendationParams,
}

/// Configure all recommendation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommend))
        .route("/applications", web::post().to(record_application))
        .route("/workers/{worker_id}/score", web::get().to(score_worker));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn repository_error_response(context: &str, e: RepositoryError) -> HttpResponse {
    use actix_web::http::StatusCode;

    match e {
        RepositoryError::NotFound(what) => error_response(StatusCode::NOT_FOUND, "Not found", what),
        RepositoryError::InvalidInput(message) => error_response(StatusCode::BAD_REQUEST, context, message),
        other => {
            tracing::error!("{}: {}", context, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context, other.to_string())
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.repository.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Fill in job coordinates from its address text when they are missing
async fn locate_job(geocoder: Option<&GeocoderClient>, mut job: Job) -> Job {
    let (Some(geocoder), None) = (geocoder, job.coordinates()) else {
        return job;
    };
    let Some(address) = job.location.clone() else {
        return job;
    };

    match geocoder.geocode(&address).await {
        Ok(Some(place)) => {
            tracing::debug!("Geocoded job {} to {:?}", job.id, place.coordinates);
            job.latitude = Some(place.coordinates.latitude);
            job.longitude = Some(place.coordinates.longitude);
            job.location = Some(place.formatted_address);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Geocoding failed for job {}, keeping it unlocated: {}", job.id, e);
        }
    }
    job
}

/// Rank workers for a job
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "job": { "id": 1, "title": "string", "latitude": 31.87, "longitude": -116.61, ... },
///   "threshold": 50,
///   "maxDistanceKm": 10,
///   "maxWorkers": 20
/// }
/// ```
async fn recommend(state: web::Data<AppState>, req: web::Json<RecommendRequest>) -> impl Responder {
    use actix_web::http::StatusCode;

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommendation request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let params = RecommendationParams {
        threshold: req.threshold.unwrap_or(state.defaults.threshold),
        max_distance_km: req.max_distance_km.unwrap_or(state.defaults.max_distance_km),
        max_workers: req.max_workers.or(state.defaults.max_workers),
    };

    let job = locate_job(state.geocoder.as_deref(), req.job).await;

    tracing::info!(
        "Recommending workers for job {} (threshold {}, radius {}km)",
        job.id,
        params.threshold,
        params.max_distance_km
    );

    match state.recommender.recommend(&job, &params).await {
        Ok(recommendation) => HttpResponse::Ok().json(RecommendResponse {
            run_id: uuid::Uuid::new_v4().to_string(),
            job_id: recommendation.job.id,
            total_scored: recommendation.total_scored,
            relaxed: recommendation.relaxed,
            threshold_applied: recommendation.threshold_applied,
            recommendations: recommendation.workers,
        }),
        Err(e) => {
            tracing::error!("Recommendation failed for job {}: {}", job.id, e);
            let error = match &e {
                RecommendError::Unavailable(_) => "Recommendation unavailable",
                RecommendError::TimedOut(_) => "Recommendation timed out",
            };
            error_response(StatusCode::SERVICE_UNAVAILABLE, error, e.to_string())
        }
    }
}

/// Record a worker's response to a job
///
/// POST /api/v1/applications
///
/// Request body:
/// ```json
/// {
///   "workerId": 1,
///   "jobId": 5,
///   "status": "pending|accepted"
/// }
/// ```
async fn record_application(
    state: web::Data<AppState>,
    req: web::Json<RecordApplicationRequest>,
) -> impl Responder {
    use actix_web::http::StatusCode;

    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let status: ApplicationStatus = match req.status.parse() {
        Ok(status) => status,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid status",
                "Status must be one of: pending, accepted".to_string(),
            );
        }
    };

    let application = NewApplication {
        worker_id: req.worker_id,
        job_id: req.job_id,
        status,
    };

    match state.repository.record_application(application).await {
        Ok(recorded) => {
            tracing::info!(
                "Worker {} responded to job {} ({:?})",
                recorded.worker_id,
                recorded.job_id,
                recorded.status
            );
            HttpResponse::Ok().json(RecordApplicationResponse {
                success: true,
                application_id: recorded.id,
            })
        }
        Err(e) => repository_error_response("Failed to record application", e),
    }
}

/// Per-signal score of one worker for one job
///
/// GET /api/v1/workers/{workerId}/score?jobId={jobId}
async fn score_worker(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<ScoreQuery>,
) -> impl Responder {
    let worker_id = path.into_inner();

    let worker = match state.repository.find_worker(worker_id).await {
        Ok(worker) => worker,
        Err(e) => return repository_error_response("Failed to fetch worker", e),
    };
    let job = match state.repository.find_job(query.job_id).await {
        Ok(job) => job,
        Err(e) => return repository_error_response("Failed to fetch job", e),
    };

    let max_distance_km = query.max_distance_km.unwrap_or(state.defaults.max_distance_km);
    let distance = distance_km(worker.coordinates(), job.coordinates());
    let breakdown = state.recommender.engine().breakdown(&worker, &job).await;

    HttpResponse::Ok().json(ScoreResponse {
        worker_id,
        job_id: job.id,
        distance_km: distance,
        within_radius: within_radius(&worker, &job, max_distance_km),
        total: breakdown.total(),
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScoringOptions;
    use crate::models::{Application, EmployerId, InteractionCounts, JobId, Worker, WorkerId};
    use crate::services::InMemoryRepository;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::time::Duration;

    /// Delegates to the in-memory store but lists workers slowly
    struct SlowListing(InMemoryRepository);

    #[async_trait]
    impl WorkerRepository for SlowListing {
        async fn list_active_workers(&self) -> Result<Vec<Worker>, RepositoryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.0.list_active_workers().await
        }

        async fn count_neighbor_applications(
            &self,
            worker_id: WorkerId,
            experience: Option<i32>,
            age: Option<i32>,
            gender: Option<&str>,
        ) -> Result<InteractionCounts, RepositoryError> {
            self.0.count_neighbor_applications(worker_id, experience, age, gender).await
        }

        async fn count_own_applications(&self, worker_id: WorkerId) -> Result<InteractionCounts, RepositoryError> {
            self.0.count_own_applications(worker_id).await
        }

        async fn count_repeat_employer_acceptances(
            &self,
            worker_id: WorkerId,
            employer_id: EmployerId,
        ) -> Result<u64, RepositoryError> {
            self.0.count_repeat_employer_acceptances(worker_id, employer_id).await
        }

        async fn find_worker(&self, worker_id: WorkerId) -> Result<Worker, RepositoryError> {
            self.0.find_worker(worker_id).await
        }

        async fn find_job(&self, job_id: JobId) -> Result<Job, RepositoryError> {
            self.0.find_job(job_id).await
        }

        async fn record_application(&self, application: NewApplication) -> Result<Application, RepositoryError> {
            self.0.record_application(application).await
        }
    }

    fn store() -> InMemoryRepository {
        let worker = Worker {
            id: 1,
            phone: "+526160000001".to_string(),
            name: Some("Ana".to_string()),
            address: None,
            latitude: Some(31.87),
            longitude: Some(-116.61),
            age: Some(30),
            gender: Some("female".to_string()),
            experience: Some(3),
            active: true,
        };
        let job = Job {
            id: 9,
            employer_id: None,
            title: "Harvest".to_string(),
            location: None,
            latitude: Some(31.87),
            longitude: Some(-116.61),
            pay_rate: "350".to_string(),
            pay_type: "per day".to_string(),
            transport_provided: true,
            duration: None,
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            description: None,
            active: true,
        };
        // About 80 km north-west of the job
        let far = Worker {
            id: 2,
            phone: "+526640000002".to_string(),
            latitude: Some(32.51),
            longitude: Some(-117.03),
            ..worker.clone()
        };
        InMemoryRepository::new(vec![worker, far], vec![job], vec![])
    }

    fn state_with(repository: Arc<dyn WorkerRepository>, recommender: Recommender) -> AppState {
        AppState {
            recommender: Arc::new(recommender),
            repository,
            geocoder: None,
            defaults: RecommendationParams::default(),
        }
    }

    fn state() -> AppState {
        let repository: Arc<dyn WorkerRepository> = Arc::new(store());
        let recommender = Recommender::new(repository.clone(), ScoringOptions::default());
        state_with(repository, recommender)
    }

    #[actix_web::test]
    async fn test_health_check_response() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.status, "healthy");
    }

    #[actix_web::test]
    async fn test_recommend_endpoint() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(configure),
        )
        .await;

        let body = serde_json::json!({
            "job": {
                "id": 9,
                "title": "Harvest",
                "latitude": 31.87,
                "longitude": -116.61,
                "pay_rate": "350",
                "pay_type": "per day",
                "date": "2026-11-02"
            }
        });
        let req = test::TestRequest::post().uri("/recommendations").set_json(&body).to_request();
        let resp: RecommendResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.job_id, 9);
        assert_eq!(resp.recommendations.len(), 1);
        assert_eq!(resp.recommendations[0].score, 65);
    }

    #[actix_web::test]
    async fn test_record_application_rejects_unknown_status() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(configure),
        )
        .await;

        let body = serde_json::json!({ "workerId": 1, "jobId": 9, "status": "maybe" });
        let req = test::TestRequest::post().uri("/applications").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_score_endpoint_breakdown() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/workers/1/score?jobId=9").to_request();
        let resp: ScoreResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.breakdown.experience, 30);
        assert_eq!(resp.total, 65);
        assert!(resp.within_radius);
    }

    #[actix_web::test]
    async fn test_score_endpoint_outside_radius() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state())).configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/workers/2/score?jobId=9").to_request();
        let resp: ScoreResponse = test::call_and_read_body_json(&app, req).await;

        assert!(resp.distance_km.unwrap() > 60.0);
        assert!(!resp.within_radius);

        let req = test::TestRequest::get().uri("/workers/2/score?jobId=9&maxDistanceKm=100").to_request();
        let resp: ScoreResponse = test::call_and_read_body_json(&app, req).await;
        assert!(resp.within_radius);
    }

    #[actix_web::test]
    async fn test_recommend_timeout_is_unavailable() {
        let repository: Arc<dyn WorkerRepository> = Arc::new(SlowListing(store()));
        let recommender = Recommender::new(repository.clone(), ScoringOptions::default())
            .with_run_timeout(Duration::from_millis(50));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(repository, recommender)))
                .configure(configure),
        )
        .await;

        let body = serde_json::json!({
            "job": {
                "id": 9,
                "title": "Harvest",
                "latitude": 31.87,
                "longitude": -116.61,
                "pay_rate": "350",
                "pay_type": "per day",
                "date": "2026-11-02"
            }
        });
        let req = test::TestRequest::post().uri("/recommendations").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);
        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.error, "Recommendation timed out");
        assert_eq!(error.status_code, 503);
    }
}
