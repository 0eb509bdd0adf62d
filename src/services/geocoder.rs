use crate::core::geo::{Coordinate, GeoResolver, ResolutionFailure};
use crate::services::cache::{CacheError, CacheKey, CacheManager};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the geocoding service
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// One search hit; Nominatim encodes coordinates as strings
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Nominatim-compatible geocoding client
///
/// Asks `/search` for the single best match of a free-text place name.
pub struct NominatimClient {
    base_url: String,
    user_agent: String,
    language: String,
    client: Client,
}

impl NominatimClient {
    pub fn new(
        base_url: String,
        user_agent: String,
        language: String,
        timeout: Duration,
    ) -> Result<Self, GeoError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            user_agent,
            language,
            client,
        })
    }

    /// Look up the best-match coordinate for `place`
    pub async fn search(&self, place: &str) -> Result<Coordinate, GeoError> {
        let url = format!(
            "{}/search?format=json&limit=1&q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(place)
        );

        tracing::debug!("Geocoding '{}' via {}", place, url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.language)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeoError::ApiError(format!(
                "Geocoder returned {}",
                response.status()
            )));
        }

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        let hit = hits
            .first()
            .ok_or_else(|| GeoError::NotFound(place.to_string()))?;

        let parse = |raw: &str| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| GeoError::InvalidResponse(format!("bad coordinate '{}'", raw)))
        };

        Ok(Coordinate::new(parse(&hit.lat)?, parse(&hit.lon)?))
    }
}

#[async_trait]
impl GeoResolver for NominatimClient {
    async fn resolve(&self, place_name: &str) -> Result<Coordinate, ResolutionFailure> {
        self.search(place_name).await.map_err(|e| ResolutionFailure {
            place: place_name.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Caches successful resolutions of another resolver
///
/// Failures are never cached, so a transient geocoder outage does not
/// stick to a place name.
pub struct CachedResolver<R> {
    inner: R,
    cache: Arc<CacheManager>,
}

impl<R: GeoResolver> CachedResolver<R> {
    pub fn new(inner: R, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<R: GeoResolver> GeoResolver for CachedResolver<R> {
    async fn resolve(&self, place_name: &str) -> Result<Coordinate, ResolutionFailure> {
        let key = CacheKey::geocode(place_name);

        match self.cache.get::<Coordinate>(&key).await {
            Ok(coordinate) => return Ok(coordinate),
            Err(CacheError::CacheMiss(_)) => {}
            Err(e) => tracing::warn!("Geocode cache lookup failed for '{}': {}", place_name, e),
        }

        let coordinate = self.inner.resolve(place_name).await?;

        if let Err(e) = self.cache.set(&key, &coordinate).await {
            tracing::warn!("Failed to cache coordinate for '{}': {}", place_name, e);
        }

        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client(base_url: String) -> NominatimClient {
        NominatimClient::new(
            base_url,
            "estate-engine-test".to_string(),
            "ru".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_parses_first_hit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "Москва".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"lat": "55.7504461", "lon": "37.6174943", "display_name": "Москва"},
                          {"lat": "1.0", "lon": "2.0"}]"#)
            .create_async()
            .await;

        let coordinate = client(server.url()).search("Москва").await.unwrap();

        mock.assert_async().await;
        assert!((coordinate.latitude - 55.7504461).abs() < 1e-9);
        assert!((coordinate.longitude - 37.6174943).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_result_and_server_error_both_fail_resolution() {
        let mut server = mockito::Server::new_async().await;
        let _empty = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "Atlantis".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let _down = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "Москва".into()))
            .with_status(503)
            .create_async()
            .await;

        let geocoder = client(server.url());
        assert!(matches!(geocoder.search("Atlantis").await, Err(GeoError::NotFound(_))));
        assert!(matches!(geocoder.search("Москва").await, Err(GeoError::ApiError(_))));
        assert!(geocoder.resolve("Atlantis").await.is_err());
        assert!(geocoder.resolve("Москва").await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "rate limited"}"#)
            .create_async()
            .await;

        assert!(matches!(
            client(server.url()).search("Казань").await,
            Err(GeoError::InvalidResponse(_))
        ));
    }

    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeoResolver for CountingResolver {
        async fn resolve(&self, place_name: &str) -> Result<Coordinate, ResolutionFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if place_name == "Казань" {
                Ok(Coordinate::new(55.79, 49.12))
            } else {
                Err(ResolutionFailure {
                    place: place_name.to_string(),
                    reason: "not found".to_string(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_cached_resolver_caches_successes_only() {
        let cache = Arc::new(CacheManager::in_memory(100, 60));
        let resolver = CachedResolver::new(CountingResolver { calls: AtomicUsize::new(0) }, cache);

        assert_eq!(resolver.resolve("Казань").await.unwrap(), Coordinate::new(55.79, 49.12));
        assert_eq!(resolver.resolve("Казань").await.unwrap(), Coordinate::new(55.79, 49.12));
        assert_eq!(resolver.inner.calls.load(Ordering::SeqCst), 1);

        assert!(resolver.resolve("Atlantis").await.is_err());
        assert!(resolver.resolve("Atlantis").await.is_err());
        assert_eq!(resolver.inner.calls.load(Ordering::SeqCst), 3);
    }
}
