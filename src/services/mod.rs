// Service exports
pub mod cache;
pub mod geocoder;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use geocoder::{CachedResolver, GeoError, NominatimClient};
pub use postgres::PostgresClient;
pub use store::{EstateRepository, InMemoryEstates, StoreError};
