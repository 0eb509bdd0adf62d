use crate::core::defaults::{FeatureDefaults, FeatureField};
use crate::core::geo::Coordinate;
use crate::core::normalizer::{RequestNormalizer, ValidationError};
use crate::core::predicate::{keys, CategoryFilter};
use serde::Serialize;

/// Single-valued keys accepted by the older prediction payload
mod single_keys {
    pub const AREA: &[&str] = &["area", "totalArea"];
    pub const KITCHEN_AREA: &[&str] = &["kitchen_area", "kitchenArea"];
    pub const LEVELS: &[&str] = &["levels"];
    pub const LEVEL: &[&str] = &["level"];
    pub const ROOMS: &[&str] = &["rooms", "numberOfRooms"];
    pub const YEAR: &[&str] = &["year"];
    pub const MONTH: &[&str] = &["month"];
    pub const DAY: &[&str] = &["day"];
}

/// Client-supplied feature values, any of which may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialFeatures {
    values: [Option<f64>; FeatureField::COUNT],
}

impl PartialFeatures {
    pub fn get(&self, field: FeatureField) -> Option<f64> {
        self.values[field.index()]
    }

    pub fn set(&mut self, field: FeatureField, value: Option<f64>) {
        self.values[field.index()] = value;
    }

    pub fn with(mut self, field: FeatureField, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }
}

/// Low and high partial feature sets read from one prediction request
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub place_name: Option<String>,
    pub low: PartialFeatures,
    pub high: PartialFeatures,
}

impl PredictionRequest {
    /// Read a prediction request
    ///
    /// Range fields feed the low set from their `*From` key and the high set
    /// from their `*To` key, each falling back to the single-valued key.
    /// Categories and the date are shared; sentinel categories count as absent.
    pub fn from_request(request: &RequestNormalizer<'_>) -> Result<Self, ValidationError> {
        let mut low = PartialFeatures::default();
        let mut high = PartialFeatures::default();

        let float_ranges = [
            (FeatureField::Area, keys::AREA_FROM, keys::AREA_TO, single_keys::AREA),
            (
                FeatureField::KitchenArea,
                keys::KITCHEN_AREA_FROM,
                keys::KITCHEN_AREA_TO,
                single_keys::KITCHEN_AREA,
            ),
        ];
        for (field, from, to, single) in float_ranges {
            let shared = request.float(single)?;
            low.set(field, request.float(from)?.or(shared));
            high.set(field, request.float(to)?.or(shared));
        }

        let int_ranges = [
            (FeatureField::Levels, keys::LEVELS_FROM, keys::LEVELS_TO, single_keys::LEVELS),
            (FeatureField::Level, keys::LEVEL_FROM, keys::LEVEL_TO, single_keys::LEVEL),
            (FeatureField::Rooms, keys::ROOMS_FROM, keys::ROOMS_TO, single_keys::ROOMS),
        ];
        for (field, from, to, single) in int_ranges {
            let shared = request.int(single)?;
            low.set(field, request.int(from)?.or(shared).map(|v| v as f64));
            high.set(field, request.int(to)?.or(shared).map(|v| v as f64));
        }

        let categories = [
            (FeatureField::BuildingType, keys::BUILDING_TYPE),
            (FeatureField::ObjectType, keys::OBJECT_TYPE),
        ];
        let dates = [
            (FeatureField::Year, single_keys::YEAR),
            (FeatureField::Month, single_keys::MONTH),
            (FeatureField::Day, single_keys::DAY),
        ];
        for (field, names) in categories {
            let value = CategoryFilter::from_raw(request.int(names)?).value().map(|v| v as f64);
            low.set(field, value);
            high.set(field, value);
        }
        for (field, names) in dates {
            let value = request.int(names)?.map(|v| v as f64);
            low.set(field, value);
            high.set(field, value);
        }

        Ok(Self {
            place_name: request.place_name(keys::CITY)?,
            low,
            high,
        })
    }
}

/// Fully populated model input, ordered as [`FeatureField::ALL`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionFeatureVector([f64; FeatureField::COUNT]);

impl PredictionFeatureVector {
    pub fn get(&self, field: FeatureField) -> f64 {
        self.0[field.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Fills partial client input into complete feature vectors
#[derive(Debug, Clone, Copy)]
pub struct FeatureVectorAssembler<'a> {
    defaults: &'a FeatureDefaults,
}

impl<'a> FeatureVectorAssembler<'a> {
    pub fn new(defaults: &'a FeatureDefaults) -> Self {
        Self { defaults }
    }

    /// Latitude and longitude come from `coordinate`, region is always its
    /// default, every other field is the client value or its default.
    pub fn assemble(&self, partial: &PartialFeatures, coordinate: Coordinate) -> PredictionFeatureVector {
        let mut values = [0.0; FeatureField::COUNT];
        for field in FeatureField::ALL {
            values[field.index()] = match field {
                FeatureField::Latitude => coordinate.latitude,
                FeatureField::Longitude => coordinate.longitude,
                FeatureField::Region => self.defaults.get_default(field),
                _ => partial
                    .get(field)
                    .unwrap_or_else(|| self.defaults.get_default(field)),
            };
        }
        PredictionFeatureVector(values)
    }

    /// Coordinate to use when the request names no place
    pub fn fallback_coordinate(&self) -> Coordinate {
        Coordinate::new(
            self.defaults.get_default(FeatureField::Latitude),
            self.defaults.get_default(FeatureField::Longitude),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::RawPayload;
    use serde_json::json;

    fn request(value: serde_json::Value) -> PredictionRequest {
        let raw: RawPayload = value.as_object().cloned().unwrap();
        PredictionRequest::from_request(&RequestNormalizer::new(&raw)).unwrap()
    }

    #[test]
    fn test_blank_area_uses_mean_area() {
        let defaults = FeatureDefaults::historical();
        let req = request(json!({"city": "Москва", "totalAreaFrom": "", "totalAreaTo": ""}));
        let vector = FeatureVectorAssembler::new(&defaults).assemble(&req.low, Coordinate::new(55.75, 37.61));

        assert_eq!(vector.get(FeatureField::Area), defaults.get_default(FeatureField::Area));
        assert_ne!(vector.get(FeatureField::Area), 0.0);
    }

    #[test]
    fn test_live_client_payload() {
        let req = request(json!({
            "city": "Москва",
            "houseType": 3,
            "kitchenAreaFrom": "",
            "kitchenAreaTo": "",
            "levelFrom": "2",
            "levelTo": "9",
            "levelsFrom": "",
            "levelsTo": "",
            "numberOfRoomsFrom": 1,
            "numberOfRoomsTo": 3,
            "objectType": -1,
            "totalAreaFrom": "35.5",
            "totalAreaTo": 70
        }));

        assert_eq!(req.place_name.as_deref(), Some("Москва"));
        assert_eq!(req.low.get(FeatureField::Level), Some(2.0));
        assert_eq!(req.high.get(FeatureField::Level), Some(9.0));
        assert_eq!(req.low.get(FeatureField::Area), Some(35.5));
        assert_eq!(req.high.get(FeatureField::Area), Some(70.0));
        assert_eq!(req.low.get(FeatureField::BuildingType), Some(3.0));
        assert_eq!(req.high.get(FeatureField::BuildingType), Some(3.0));
        assert_eq!(req.low.get(FeatureField::ObjectType), None);
        assert_eq!(req.low.get(FeatureField::KitchenArea), None);
    }

    #[test]
    fn test_single_value_keys_feed_both_sides() {
        let req = request(json!({"area": 50, "area_to": 65, "rooms": 2, "year": 2021}));

        assert_eq!(req.low.get(FeatureField::Area), Some(50.0));
        assert_eq!(req.high.get(FeatureField::Area), Some(65.0));
        assert_eq!(req.low.get(FeatureField::Rooms), Some(2.0));
        assert_eq!(req.high.get(FeatureField::Rooms), Some(2.0));
        assert_eq!(req.high.get(FeatureField::Year), Some(2021.0));
    }

    #[test]
    fn test_assemble_fills_every_field() {
        let defaults = FeatureDefaults::historical();
        let assembler = FeatureVectorAssembler::new(&defaults);
        let partial = PartialFeatures::default()
            .with(FeatureField::Rooms, 3.0)
            .with(FeatureField::Region, 77.0)
            .with(FeatureField::Latitude, 1.0);
        let coordinate = Coordinate::new(59.93, 30.33);

        let vector = assembler.assemble(&partial, coordinate);

        assert_eq!(vector.as_slice().len(), FeatureField::COUNT);
        assert!(vector.as_slice().iter().all(|v| v.is_finite()));
        assert_eq!(vector.get(FeatureField::Latitude), 59.93);
        assert_eq!(vector.get(FeatureField::Longitude), 30.33);
        assert_eq!(vector.get(FeatureField::Rooms), 3.0);
        // Region is never taken from the client
        assert_eq!(vector.get(FeatureField::Region), defaults.get_default(FeatureField::Region));
        assert_eq!(vector.get(FeatureField::Day), defaults.get_default(FeatureField::Day));
    }

    #[test]
    fn test_fallback_coordinate_is_mean_location() {
        let defaults = FeatureDefaults::historical();
        let coordinate = FeatureVectorAssembler::new(&defaults).fallback_coordinate();
        assert_eq!(coordinate.latitude, defaults.get_default(FeatureField::Latitude));
        assert_eq!(coordinate.longitude, defaults.get_default(FeatureField::Longitude));
    }
}
