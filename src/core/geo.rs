use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Proximity radius around a resolved place, in degrees
pub const DEFAULT_GEO_DELTA: f64 = 0.4;

/// A resolved point on the map
///
/// Only ever produced by a [`GeoResolver`]; the engine reads it and never
/// persists it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Axis-aligned square of half-width `delta` degrees around this point
    ///
    /// This is a coarse proximity filter, not a geodesic circle:
    /// the same `delta` is applied to latitude and longitude.
    pub fn bounding_box(&self, delta: f64) -> BoundingBox {
        BoundingBox {
            min_lat: self.latitude - delta,
            max_lat: self.latitude + delta,
            min_lon: self.longitude - delta,
            max_lon: self.longitude + delta,
        }
    }
}

/// Closed latitude/longitude rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Check if a point lies inside the box, edges included
    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// A place name the geocoder could not turn into a coordinate
///
/// Network errors, empty results and malformed responses all end up here;
/// `reason` is for logs only.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Could not resolve place '{place}': {reason}")]
pub struct ResolutionFailure {
    pub place: String,
    pub reason: String,
}

/// Free-text place name to single best-match coordinate
#[async_trait]
pub trait GeoResolver: Send + Sync {
    async fn resolve(&self, place_name: &str) -> Result<Coordinate, ResolutionFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_around_moscow() {
        let bbox = Coordinate::new(55.75, 37.61).bounding_box(DEFAULT_GEO_DELTA);

        assert!((bbox.min_lat - 55.35).abs() < 1e-9);
        assert!((bbox.max_lat - 56.15).abs() < 1e-9);
        assert!((bbox.min_lon - 37.21).abs() < 1e-9);
        assert!((bbox.max_lon - 38.01).abs() < 1e-9);
    }

    #[test]
    fn test_box_is_square_in_degrees() {
        // Longitude span does not shrink with latitude
        let bbox = Coordinate::new(70.0, 10.0).bounding_box(0.5);
        let lat_span = bbox.max_lat - bbox.min_lat;
        let lon_span = bbox.max_lon - bbox.min_lon;
        assert!((lat_span - lon_span).abs() < 1e-9);
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = Coordinate::new(55.75, 37.61).bounding_box(0.4);

        assert!(bbox.contains(55.75, 37.61));
        assert!(bbox.contains(bbox.min_lat, bbox.max_lon));
        assert!(!bbox.contains(59.93, 30.33));
        assert!(!bbox.contains(bbox.max_lat + 0.01, 37.61));
    }
}
