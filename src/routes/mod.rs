// Route exports
pub mod estates;
pub mod prediction;

use crate::core::{Engine, EngineError, ResultPager};
use crate::models::{ErrorResponse, HealthResponse};
use crate::services::EstateRepository;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub store: Arc<dyn EstateRepository>,
    pub pager: ResultPager,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .configure(estates::configure)
            .configure(prediction::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Map a pipeline failure onto the shared error body
///
/// Resolution and validation failures are the client's fault; a model
/// failure is ours.
pub(crate) fn engine_error_response(err: &EngineError) -> HttpResponse {
    match err {
        EngineError::Resolution { place } => HttpResponse::BadRequest().json(ErrorResponse::new(
            "Bad input",
            format!("Could not find place '{}'", place),
            400,
        )),
        EngineError::Validation(e) => {
            HttpResponse::BadRequest().json(ErrorResponse::new("Validation failed", e.to_string(), 400))
        }
        EngineError::Scoring(e) => {
            tracing::error!("Price model failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Prediction failed",
                e.to_string(),
                500,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValidationError;

    #[test]
    fn test_engine_error_status_codes() {
        let resolution = EngineError::Resolution { place: "Atlantis".to_string() };
        let validation = EngineError::Validation(ValidationError::UnexpectedType { field: "rooms_from".to_string() });
        let scoring = EngineError::Scoring(crate::core::ScoringError::NonFinite(f64::NAN));

        assert_eq!(engine_error_response(&resolution).status(), 400);
        assert_eq!(engine_error_response(&validation).status(), 400);
        assert_eq!(engine_error_response(&scoring).status(), 500);
    }
}
