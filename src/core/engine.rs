use crate::core::defaults::FeatureDefaults;
use crate::core::estimator::{DualPriceEstimator, PriceModel, PricePair, ScoringError};
use crate::core::features::{FeatureVectorAssembler, PredictionRequest};
use crate::core::geo::{Coordinate, GeoResolver};
use crate::core::normalizer::{RawPayload, RequestNormalizer, ValidationError};
use crate::core::predicate::{keys, EstateSearchCriteria, FilterPredicateBuilder, Predicate};
use std::sync::Arc;
use thiserror::Error;

/// Failures the search and prediction pipelines report to their caller
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Could not resolve place '{place}'")]
    Resolution { place: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Search-and-predict engine
///
/// # Pipelines
/// - search: normalize → resolve place → build predicate
/// - predict: normalize → resolve place → assemble low/high vectors → score
///
/// Holds no per-request state; one instance serves all handlers.
pub struct Engine {
    defaults: FeatureDefaults,
    predicate_builder: FilterPredicateBuilder,
    model: Arc<dyn PriceModel>,
    resolver: Arc<dyn GeoResolver>,
    monetary_unit: f64,
}

impl Engine {
    pub fn new(
        defaults: FeatureDefaults,
        predicate_builder: FilterPredicateBuilder,
        model: Arc<dyn PriceModel>,
        resolver: Arc<dyn GeoResolver>,
        monetary_unit: f64,
    ) -> Self {
        Self {
            defaults,
            predicate_builder,
            model,
            resolver,
            monetary_unit,
        }
    }

    pub fn defaults(&self) -> &FeatureDefaults {
        &self.defaults
    }

    /// Geocode a place name; every collaborator failure looks the same here
    pub async fn resolve(&self, place: &str) -> Result<Coordinate, EngineError> {
        self.resolver.resolve(place).await.map_err(|e| {
            tracing::info!("Place resolution failed: {}", e);
            EngineError::Resolution {
                place: place.to_string(),
            }
        })
    }

    async fn resolve_optional(&self, place: Option<&str>) -> Result<Option<Coordinate>, EngineError> {
        match place {
            Some(place) => self.resolve(place).await.map(Some),
            None => Ok(None),
        }
    }

    /// Turn a search payload into a listing predicate
    ///
    /// A payload without a place name searches everywhere; one whose place
    /// cannot be resolved fails before any predicate is built.
    pub async fn search_predicate(&self, payload: &RawPayload) -> Result<Predicate, EngineError> {
        let request = RequestNormalizer::new(payload);
        let criteria = EstateSearchCriteria::from_request(&request, self.monetary_unit)?;
        let place = request.place_name(keys::CITY)?;

        let coordinate = self.resolve_optional(place.as_deref()).await?;
        let predicate = self.predicate_builder.build(&criteria.with_coordinate(coordinate));

        tracing::debug!("Built search predicate: {}", predicate);

        Ok(predicate)
    }

    /// Estimate a low/high price pair for a hypothetical listing
    ///
    /// Without a place name the historical mean location is used.
    pub async fn predict(&self, payload: &RawPayload) -> Result<PricePair, EngineError> {
        let request = PredictionRequest::from_request(&RequestNormalizer::new(payload))?;
        let assembler = FeatureVectorAssembler::new(&self.defaults);

        let coordinate = self
            .resolve_optional(request.place_name.as_deref())
            .await?
            .unwrap_or_else(|| assembler.fallback_coordinate());

        let low_vector = assembler.assemble(&request.low, coordinate);
        let high_vector = assembler.assemble(&request.high, coordinate);

        tracing::debug!("Feature vectors: from={:?} to={:?}", low_vector, high_vector);

        let pair = DualPriceEstimator::new(self.model.as_ref(), self.monetary_unit)
            .estimate(&low_vector, &high_vector)?;

        tracing::info!(
            "Predicted price range {}..{} for {}",
            pair.low,
            pair.high,
            request.place_name.as_deref().unwrap_or("<mean location>")
        );

        Ok(pair)
    }
}
