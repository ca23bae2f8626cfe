use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::models::RecommendationParams;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Shared tier; only the in-process tier is used when unset
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            redis_url: None,
            ttl_secs: None,
            l1_cache_size: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    pub max_workers: Option<usize>,
    #[serde(default = "default_scoring_concurrency")]
    pub scoring_concurrency: usize,
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    #[serde(default)]
    pub repeat_employer_bonus: bool,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_distance_km: default_max_distance_km(),
            max_workers: None,
            scoring_concurrency: default_scoring_concurrency(),
            run_timeout_secs: default_run_timeout_secs(),
            repeat_employer_bonus: false,
        }
    }
}

impl RecommendationSettings {
    /// Parameters used when a request does not override them
    pub fn default_params(&self) -> RecommendationParams {
        RecommendationParams {
            threshold: self.threshold,
            max_distance_km: self.max_distance_km,
            max_workers: self.max_workers,
        }
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

fn default_true() -> bool { true }
fn default_threshold() -> u32 { 50 }
fn default_max_distance_km() -> f64 { 10.0 }
fn default_scoring_concurrency() -> usize { 16 }
fn default_run_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoder_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoder_timeout_secs(),
        }
    }
}

fn default_geocoder_endpoint() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { format!("jobcast/{}", env!("CARGO_PKG_VERSION")) }
fn default_geocoder_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with JOBCAST__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., JOBCAST__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("JOBCAST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = apply_env_overrides(settings)?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make every recommendation run empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let recommendation = &self.recommendation;

        if recommendation.run_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "recommendation.run_timeout_secs must be at least 1".to_string(),
            ));
        }
        if recommendation.max_workers == Some(0) {
            return Err(ConfigError::Message(
                "recommendation.max_workers must be at least 1 when set".to_string(),
            ));
        }
        if recommendation.threshold > 100 {
            return Err(ConfigError::Message(
                "recommendation.threshold must be between 0 and 100".to_string(),
            ));
        }

        Ok(())
    }
}

/// Conventional DATABASE_URL / REDIS_URL variables win over config files
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    builder.build()
}
