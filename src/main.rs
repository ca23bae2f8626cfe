use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use jobcast::config::Settings;
use jobcast::core::{Recommender, ScoringOptions};
use jobcast::routes::{self, recommendations::AppState};
use jobcast::services::{CacheManager, CachedRepository, GeocoderClient, PgRepository, WorkerRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    // LOG_LEVEL / LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_logging(&log_level, &log_format);

    info!("Starting Jobcast recommendation service...");

    let postgres = PgRepository::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
    })?;

    info!(
        "PostgreSQL repository initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let mut repository: Arc<dyn WorkerRepository> = Arc::new(postgres);

    // Statistics cache (optional - the engine works without it)
    if settings.cache.enabled {
        let ttl = settings.cache.ttl_secs.unwrap_or(300);
        let l1_size = settings.cache.l1_cache_size.unwrap_or(10_000);

        let cache = match settings.cache.redis_url.as_deref() {
            Some(redis_url) => match CacheManager::new(redis_url, l1_size, ttl).await {
                Ok(cache) => cache,
                Err(e) => {
                    warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                    CacheManager::in_memory(l1_size, ttl)
                }
            },
            None => CacheManager::in_memory(l1_size, ttl),
        };

        info!(
            "Statistics cache initialized (L1: {} entries, TTL: {}s, shared: {})",
            l1_size,
            ttl,
            cache.has_shared_tier()
        );
        repository = Arc::new(CachedRepository::new(repository, Arc::new(cache)));
    }

    let geocoder = if settings.geocoder.enabled {
        let client = GeocoderClient::new(
            settings.geocoder.endpoint.clone(),
            &settings.geocoder.user_agent,
            Duration::from_secs(settings.geocoder.timeout_secs),
        )
        .map_err(|e| {
            error!("Failed to build geocoder client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })?;
        info!("Geocoder enabled ({})", settings.geocoder.endpoint);
        Some(Arc::new(client))
    } else {
        None
    };

    let recommendation = &settings.recommendation;
    let recommender = Recommender::new(
        repository.clone(),
        ScoringOptions {
            repeat_employer_bonus: recommendation.repeat_employer_bonus,
        },
    )
    .with_concurrency(recommendation.scoring_concurrency)
    .with_run_timeout(recommendation.run_timeout());

    info!("Recommender initialized: {:?}", recommender);

    let app_state = AppState {
        repository,
        recommender: Arc::new(recommender),
        geocoder,
        defaults: recommendation.default_params(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
