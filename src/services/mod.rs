// Service exports
pub mod cache;
pub mod cached;
pub mod geocoder;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use cached::CachedRepository;
pub use geocoder::{GeocodeError, GeocodedAddress, GeocoderClient};
pub use memory::InMemoryRepository;
pub use postgres::PgRepository;
pub use repository::{RepositoryError, WorkerRepository};
