// Core algorithm exports
pub mod defaults;
pub mod engine;
pub mod estimator;
pub mod features;
pub mod geo;
pub mod model;
pub mod normalizer;
pub mod pager;
pub mod predicate;

pub use defaults::{FeatureDefaults, FeatureField, UnknownFeature};
pub use engine::{Engine, EngineError};
pub use estimator::{DualPriceEstimator, PriceModel, PricePair, ScoringError, MONETARY_UNIT};
pub use features::{FeatureVectorAssembler, PartialFeatures, PredictionFeatureVector, PredictionRequest};
pub use geo::{BoundingBox, Coordinate, GeoResolver, ResolutionFailure, DEFAULT_GEO_DELTA};
pub use model::{ModelLoadError, TreeEnsembleModel};
pub use normalizer::{normalize_place_name, RawPayload, RequestNormalizer, ValidationError};
pub use pager::{listing_order, Page, PageRequest, ResultPager, LISTING_ORDER};
pub use predicate::{
    CategoryFilter, Comparison, Constraint, EstateColumn, EstateSearchCriteria, FilterPredicateBuilder,
    Predicate, RangeQuery, Scalar, NO_FILTER_SENTINELS,
};
