use super::{engine_error_response, AppState};
use crate::core::RawPayload;
use actix_web::{web, HttpResponse, Responder};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/prediction", web::post().to(predict_price))
        .route("/prediction", web::get().to(predict_price));
}

/// Price range for a hypothetical listing
///
/// POST /api/prediction
///
/// Request body:
/// ```json
/// {
///   "city": "Москва",
///   "totalAreaFrom": 40, "totalAreaTo": 60,
///   "numberOfRoomsFrom": 2, "numberOfRoomsTo": 3,
///   "houseType": 2
/// }
/// ```
///
/// Response: `{"low": 2900000, "high": 3860000}`
async fn predict_price(state: web::Data<AppState>, body: web::Json<RawPayload>) -> impl Responder {
    match state.engine.predict(&body).await {
        Ok(pair) => HttpResponse::Ok().json(pair),
        Err(e) => {
            tracing::info!("Prediction rejected: {}", e);
            engine_error_response(&e)
        }
    }
}
