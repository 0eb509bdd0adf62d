//! Estate Engine - listing search and price prediction service
//!
//! Turns sparse client queries into listing predicates with a coarse
//! geographic bounding box, and estimates a low/high price range for a
//! hypothetical property from a pre-trained regression model.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    Coordinate, DualPriceEstimator, Engine, EngineError, FeatureDefaults, FeatureVectorAssembler,
    FilterPredicateBuilder, GeoResolver, Predicate, PriceModel, PricePair, ResultPager, TreeEnsembleModel,
};
pub use models::{Estate, NewEstate};
