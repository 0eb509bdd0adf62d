use crate::core::geo::{Coordinate, DEFAULT_GEO_DELTA};
use crate::core::normalizer::{RequestNormalizer, ValidationError};
use crate::models::Estate;
use serde::Serialize;
use std::fmt;

/// Category values that mean "do not filter on this field"
pub const NO_FILTER_SENTINELS: [i64; 2] = [-1, -2];

/// Payload keys, snake_case dialect first, then the camelCase client schema
pub mod keys {
    pub const CITY: &[&str] = &["city"];
    pub const PRICE_FROM: &[&str] = &["price_from"];
    pub const PRICE_TO: &[&str] = &["price_to"];
    /// Price bounds in display currency rather than model units
    pub const PRICE_FROM_CURRENCY: &[&str] = &["priceFrom"];
    pub const PRICE_TO_CURRENCY: &[&str] = &["priceTo"];
    pub const AREA_FROM: &[&str] = &["area_from", "totalAreaFrom"];
    pub const AREA_TO: &[&str] = &["area_to", "totalAreaTo"];
    pub const KITCHEN_AREA_FROM: &[&str] = &["kitchen_area_from", "kitchenAreaFrom"];
    pub const KITCHEN_AREA_TO: &[&str] = &["kitchen_area_to", "kitchenAreaTo"];
    pub const LEVELS_FROM: &[&str] = &["levels_from", "levelsFrom"];
    pub const LEVELS_TO: &[&str] = &["levels_to", "levelsTo"];
    pub const LEVEL_FROM: &[&str] = &["level_from", "levelFrom"];
    pub const LEVEL_TO: &[&str] = &["level_to", "levelTo"];
    pub const ROOMS_FROM: &[&str] = &["rooms_from", "numberOfRoomsFrom"];
    pub const ROOMS_TO: &[&str] = &["rooms_to", "numberOfRoomsTo"];
    pub const BUILDING_TYPE: &[&str] = &["building_type", "houseType"];
    pub const OBJECT_TYPE: &[&str] = &["object_type", "objectType"];
}

/// Listing columns a predicate may constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstateColumn {
    Price,
    Area,
    KitchenArea,
    Levels,
    Level,
    Rooms,
    BuildingType,
    ObjectType,
    Latitude,
    Longitude,
}

impl EstateColumn {
    /// Column name in the listing table
    pub const fn as_str(self) -> &'static str {
        match self {
            EstateColumn::Price => "price",
            EstateColumn::Area => "area",
            EstateColumn::KitchenArea => "kitchen_area",
            EstateColumn::Levels => "levels",
            EstateColumn::Level => "level",
            EstateColumn::Rooms => "rooms",
            EstateColumn::BuildingType => "building_type",
            EstateColumn::ObjectType => "object_type",
            EstateColumn::Latitude => "latitude",
            EstateColumn::Longitude => "longitude",
        }
    }
}

/// A bound value, kept in the type the column stores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "=")]
    Equal,
}

impl Comparison {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Comparison::AtLeast => ">=",
            Comparison::AtMost => "<=",
            Comparison::Equal => "=",
        }
    }
}

/// One `column op value` term of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Constraint {
    pub column: EstateColumn,
    pub op: Comparison,
    pub value: Scalar,
}

impl Constraint {
    pub fn at_least(column: EstateColumn, value: impl Into<Scalar>) -> Self {
        Self { column, op: Comparison::AtLeast, value: value.into() }
    }

    pub fn at_most(column: EstateColumn, value: impl Into<Scalar>) -> Self {
        Self { column, op: Comparison::AtMost, value: value.into() }
    }

    pub fn equal(column: EstateColumn, value: impl Into<Scalar>) -> Self {
        Self { column, op: Comparison::Equal, value: value.into() }
    }

    /// Evaluate against a stored value; a missing value never matches,
    /// the same way SQL treats NULL
    #[inline]
    pub fn holds(&self, actual: Option<f64>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let bound = self.value.as_f64();
        match self.op {
            Comparison::AtLeast => actual >= bound,
            Comparison::AtMost => actual <= bound,
            Comparison::Equal => actual == bound,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column.as_str(), self.op.as_sql(), self.value)
    }
}

/// Conjunction of constraints; empty matches every listing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Predicate {
    constraints: Vec<Constraint>,
}

impl Predicate {
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Constraints that touch one column
    pub fn for_column(&self, column: EstateColumn) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.column == column)
    }

    pub fn matches(&self, estate: &Estate) -> bool {
        self.constraints
            .iter()
            .all(|c| c.holds(estate.value_of(c.column)))
    }

    fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }
}

impl FromIterator<Constraint> for Predicate {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return f.write_str("TRUE");
        }
        for (i, c) in self.constraints.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Optional lower and upper bound on one numeric field
///
/// Bounds are passed through as given: a lower bound above the upper one
/// yields an unsatisfiable predicate rather than being swapped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeQuery<T> {
    pub lower: Option<T>,
    pub upper: Option<T>,
}

impl<T> RangeQuery<T> {
    pub fn new(lower: Option<T>, upper: Option<T>) -> Self {
        Self { lower, upper }
    }
}

/// Exact-match filter on a categorical field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    Any,
    Exactly(i64),
}

impl CategoryFilter {
    /// Interpret a client value, mapping the reserved sentinels to [`CategoryFilter::Any`]
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(v) if !NO_FILTER_SENTINELS.contains(&v) => CategoryFilter::Exactly(v),
            _ => CategoryFilter::Any,
        }
    }

    pub fn value(self) -> Option<i64> {
        match self {
            CategoryFilter::Any => None,
            CategoryFilter::Exactly(v) => Some(v),
        }
    }
}

/// Everything a listing search may filter on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstateSearchCriteria {
    pub price: RangeQuery<f64>,
    pub area: RangeQuery<f64>,
    pub kitchen_area: RangeQuery<f64>,
    pub levels: RangeQuery<i64>,
    pub level: RangeQuery<i64>,
    pub rooms: RangeQuery<i64>,
    pub building_type: CategoryFilter,
    pub object_type: CategoryFilter,
    pub coordinate: Option<Coordinate>,
}

impl EstateSearchCriteria {
    /// Read search criteria from a normalized payload
    ///
    /// The coordinate is left empty; resolving the place name is the
    /// caller's job. `monetary_unit` converts currency price bounds into
    /// the model units the listing table stores.
    pub fn from_request(
        request: &RequestNormalizer<'_>,
        monetary_unit: f64,
    ) -> Result<Self, ValidationError> {
        let price_bound = |model_keys: &[&'static str],
                           currency_keys: &[&'static str]|
         -> Result<Option<f64>, ValidationError> {
            match request.float(model_keys)? {
                Some(v) => Ok(Some(v)),
                None => Ok(request.float(currency_keys)?.map(|v| v / monetary_unit)),
            }
        };

        Ok(Self {
            price: RangeQuery::new(
                price_bound(keys::PRICE_FROM, keys::PRICE_FROM_CURRENCY)?,
                price_bound(keys::PRICE_TO, keys::PRICE_TO_CURRENCY)?,
            ),
            area: RangeQuery::new(request.float(keys::AREA_FROM)?, request.float(keys::AREA_TO)?),
            kitchen_area: RangeQuery::new(
                request.float(keys::KITCHEN_AREA_FROM)?,
                request.float(keys::KITCHEN_AREA_TO)?,
            ),
            levels: RangeQuery::new(request.int(keys::LEVELS_FROM)?, request.int(keys::LEVELS_TO)?),
            level: RangeQuery::new(request.int(keys::LEVEL_FROM)?, request.int(keys::LEVEL_TO)?),
            rooms: RangeQuery::new(request.int(keys::ROOMS_FROM)?, request.int(keys::ROOMS_TO)?),
            building_type: CategoryFilter::from_raw(request.int(keys::BUILDING_TYPE)?),
            object_type: CategoryFilter::from_raw(request.int(keys::OBJECT_TYPE)?),
            coordinate: None,
        })
    }

    pub fn with_coordinate(mut self, coordinate: Option<Coordinate>) -> Self {
        self.coordinate = coordinate;
        self
    }
}

/// Turns search criteria into a storage predicate
#[derive(Debug, Clone, Copy)]
pub struct FilterPredicateBuilder {
    geo_delta: f64,
}

impl FilterPredicateBuilder {
    pub fn new(geo_delta: f64) -> Self {
        Self { geo_delta }
    }

    pub fn geo_delta(&self) -> f64 {
        self.geo_delta
    }

    /// Build the conjunction for `criteria`
    ///
    /// Absent bounds and [`CategoryFilter::Any`] contribute nothing. A
    /// coordinate adds a closed square of half-width `geo_delta` degrees.
    pub fn build(&self, criteria: &EstateSearchCriteria) -> Predicate {
        let mut predicate = Predicate::default();

        push_range(&mut predicate, EstateColumn::Price, &criteria.price);
        push_range(&mut predicate, EstateColumn::Area, &criteria.area);
        push_range(&mut predicate, EstateColumn::KitchenArea, &criteria.kitchen_area);
        push_range(&mut predicate, EstateColumn::Levels, &criteria.levels);
        push_range(&mut predicate, EstateColumn::Level, &criteria.level);
        push_range(&mut predicate, EstateColumn::Rooms, &criteria.rooms);

        if let CategoryFilter::Exactly(v) = criteria.building_type {
            predicate.push(Constraint::equal(EstateColumn::BuildingType, v));
        }
        if let CategoryFilter::Exactly(v) = criteria.object_type {
            predicate.push(Constraint::equal(EstateColumn::ObjectType, v));
        }

        if let Some(coordinate) = criteria.coordinate {
            let bbox = coordinate.bounding_box(self.geo_delta);
            predicate.push(Constraint::at_least(EstateColumn::Latitude, bbox.min_lat));
            predicate.push(Constraint::at_most(EstateColumn::Latitude, bbox.max_lat));
            predicate.push(Constraint::at_least(EstateColumn::Longitude, bbox.min_lon));
            predicate.push(Constraint::at_most(EstateColumn::Longitude, bbox.max_lon));
        }

        predicate
    }
}

impl Default for FilterPredicateBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_GEO_DELTA)
    }
}

fn push_range<T>(predicate: &mut Predicate, column: EstateColumn, range: &RangeQuery<T>)
where
    T: Copy + Into<Scalar>,
{
    if let Some(lower) = range.lower {
        predicate.push(Constraint::at_least(column, lower));
    }
    if let Some(upper) = range.upper {
        predicate.push(Constraint::at_most(column, upper));
    }
}
