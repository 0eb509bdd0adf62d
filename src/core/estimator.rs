use crate::core::features::PredictionFeatureVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model output to display currency (the model predicts millions)
pub const MONETARY_UNIT: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("Model evaluation failed: {0}")]
    Model(String),

    #[error("Model produced a non-finite value: {0}")]
    NonFinite(f64),

    #[error("Model expects {expected} features, got {actual}")]
    WrongArity { expected: usize, actual: usize },
}

/// Pre-trained price regression
///
/// Stateless and deterministic; implementations must be shareable across
/// request handlers.
pub trait PriceModel: Send + Sync {
    /// Raw model output for one feature vector, in model units
    fn score(&self, features: &PredictionFeatureVector) -> Result<f64, ScoringError>;
}

/// Ordered price estimate in display currency, `low <= high`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePair {
    pub low: i64,
    pub high: i64,
}

/// Scores a low and a high feature vector and orders the results
///
/// The model is not monotonic in the from/to construction, so the "low"
/// vector may well score higher; the outputs are swapped in that case.
#[derive(Clone, Copy)]
pub struct DualPriceEstimator<'a> {
    model: &'a dyn PriceModel,
    monetary_unit: f64,
}

impl<'a> DualPriceEstimator<'a> {
    pub fn new(model: &'a dyn PriceModel, monetary_unit: f64) -> Self {
        Self { model, monetary_unit }
    }

    pub fn estimate(
        &self,
        low_vector: &PredictionFeatureVector,
        high_vector: &PredictionFeatureVector,
    ) -> Result<PricePair, ScoringError> {
        let low = self.scaled(low_vector)?;
        let high = self.scaled(high_vector)?;

        tracing::debug!("Scored vectors: from={} to={}", low, high);

        let (low, high) = if low > high { (high, low) } else { (low, high) };
        Ok(PricePair { low, high })
    }

    fn scaled(&self, vector: &PredictionFeatureVector) -> Result<i64, ScoringError> {
        let raw = self.model.score(vector)?;
        let scaled = raw * self.monetary_unit;
        if !scaled.is_finite() {
            return Err(ScoringError::NonFinite(raw));
        }
        Ok(scaled.round() as i64)
    }
}
