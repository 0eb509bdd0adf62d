use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A feature name that is not part of the model input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown feature field: {0}")]
pub struct UnknownFeature(pub String);

/// The 13 model inputs, in the order the price model consumes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    Latitude,
    Longitude,
    Region,
    BuildingType,
    Level,
    Levels,
    Rooms,
    Area,
    KitchenArea,
    ObjectType,
    Year,
    Month,
    Day,
}

impl FeatureField {
    pub const COUNT: usize = 13;

    pub const ALL: [FeatureField; Self::COUNT] = [
        FeatureField::Latitude,
        FeatureField::Longitude,
        FeatureField::Region,
        FeatureField::BuildingType,
        FeatureField::Level,
        FeatureField::Levels,
        FeatureField::Rooms,
        FeatureField::Area,
        FeatureField::KitchenArea,
        FeatureField::ObjectType,
        FeatureField::Year,
        FeatureField::Month,
        FeatureField::Day,
    ];

    /// Position of this field in the feature vector
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            FeatureField::Latitude => "latitude",
            FeatureField::Longitude => "longitude",
            FeatureField::Region => "region",
            FeatureField::BuildingType => "building_type",
            FeatureField::Level => "level",
            FeatureField::Levels => "levels",
            FeatureField::Rooms => "rooms",
            FeatureField::Area => "area",
            FeatureField::KitchenArea => "kitchen_area",
            FeatureField::ObjectType => "object_type",
            FeatureField::Year => "year",
            FeatureField::Month => "month",
            FeatureField::Day => "day",
        }
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureField {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Historical means used to fill fields a client left blank
///
/// Built once at startup and shared read-only between requests. Lookup is
/// total over [`FeatureField`]; names only enter through
/// [`FeatureDefaults::with_overrides`] and [`FeatureDefaults::get_by_name`],
/// both of which reject anything that is not a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDefaults {
    values: [f64; FeatureField::COUNT],
}

impl FeatureDefaults {
    /// Means computed offline from the listing history the model was trained on
    pub fn historical() -> Self {
        let mut values = [0.0; FeatureField::COUNT];
        values[FeatureField::Latitude.index()] = 53.99417622805179;
        values[FeatureField::Longitude.index()] = 53.494079516877704;
        values[FeatureField::Region.index()] = 4355.334007490706;
        values[FeatureField::BuildingType.index()] = 2.37895545329201;
        values[FeatureField::Level.index()] = 6.189537216596486;
        values[FeatureField::Levels.index()] = 11.371798225728519;
        values[FeatureField::Rooms.index()] = 1.7032101298631173;
        values[FeatureField::Area.index()] = 52.781284387099916;
        values[FeatureField::KitchenArea.index()] = 10.462786904018218;
        values[FeatureField::ObjectType.index()] = 0.7055776250755261;
        values[FeatureField::Year.index()] = 2019.3724843617772;
        values[FeatureField::Month.index()] = 6.628343097815816;
        values[FeatureField::Day.index()] = 16.179484811442926;
        Self { values }
    }

    /// Replace individual defaults, keyed by feature name
    ///
    /// An unrecognized name is a configuration error and fails the whole call.
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Result<Self, UnknownFeature> {
        for (name, value) in overrides {
            let field: FeatureField = name.parse()?;
            self.values[field.index()] = *value;
        }
        Ok(self)
    }

    #[inline]
    pub fn get_default(&self, field: FeatureField) -> f64 {
        self.values[field.index()]
    }

    pub fn get_by_name(&self, name: &str) -> Result<f64, UnknownFeature> {
        name.parse().map(|field| self.get_default(field))
    }
}

impl Default for FeatureDefaults {
    fn default() -> Self {
        Self::historical()
    }
}
