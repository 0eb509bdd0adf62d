use super::{engine_error_response, AppState};
use crate::core::{normalize_place_name, Predicate, RawPayload};
use crate::models::{CreateEstateRequest, ErrorResponse, NewEstate, PageParams};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveTime;
use validator::Validate;

/// Configure all listing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/estate/all", web::get().to(list_estates))
        .route("/estate/where", web::post().to(search_estates))
        .route("/estate/where", web::get().to(search_estates))
        .route("/estate/user/{user_id}", web::get().to(user_estates))
        .route("/estate/user", web::post().to(create_estate));
}

/// All listings in listing order
///
/// GET /api/estate/all?limit=50&offset=0
async fn list_estates(state: web::Data<AppState>, query: web::Query<PageParams>) -> impl Responder {
    let page = state.pager.page_request(query.limit, query.offset);

    match state.store.find(&Predicate::default(), page).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            tracing::error!("Failed to list estates: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to fetch estates",
                e.to_string(),
                500,
            ))
        }
    }
}

/// Filtered search
///
/// POST /api/estate/where?limit=50&offset=0
///
/// Request body (every key optional; camelCase aliases accepted):
/// ```json
/// {
///   "city": "Москва",
///   "price_from": 1, "price_to": 15,
///   "area_from": 56.5, "area_to": 80.5,
///   "building_type": 2, "object_type": -1,
///   "rooms_from": 2
/// }
/// ```
async fn search_estates(
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
    body: web::Json<RawPayload>,
) -> impl Responder {
    let predicate = match state.engine.search_predicate(&body).await {
        Ok(predicate) => predicate,
        Err(e) => {
            tracing::info!("Search rejected: {}", e);
            return engine_error_response(&e);
        }
    };

    let page = state.pager.page_request(query.limit, query.offset);

    match state.store.find(&predicate, page).await {
        Ok(result) if result.total == 0 => {
            tracing::info!("No estates match {}", predicate);
            HttpResponse::NotFound().json(ErrorResponse::new(
                "Nothing found",
                "No estates match the given filters",
                404,
            ))
        }
        Ok(result) => {
            tracing::info!("Returning {} of {} matching estates", result.items.len(), result.total);
            HttpResponse::Ok().json(result)
        }
        Err(e) => {
            tracing::error!("Failed to search estates: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to search estates",
                e.to_string(),
                500,
            ))
        }
    }
}

/// Listings published by one user
///
/// GET /api/estate/user/{user_id}?limit=50&offset=0
async fn user_estates(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    query: web::Query<PageParams>,
) -> impl Responder {
    let user_id = path.into_inner();
    let page = state.pager.page_request(query.limit, query.offset);

    match state.store.find_by_user(user_id, page).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            tracing::error!("Failed to fetch estates for user {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to fetch estates",
                e.to_string(),
                500,
            ))
        }
    }
}

/// Publish a listing; the city is geocoded to store its coordinates
///
/// POST /api/estate/user
async fn create_estate(state: web::Data<AppState>, req: web::Json<CreateEstateRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let time = match req.time.as_deref().map(|t| NaiveTime::parse_from_str(t.trim(), "%H:%M:%S")) {
        None => None,
        Some(Ok(time)) => Some(time),
        Some(Err(e)) => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "Validation failed",
                format!("time must be HH:MM:SS: {}", e),
                400,
            ));
        }
    };

    let Some(city) = normalize_place_name(&req.city) else {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            "city must not be blank",
            400,
        ));
    };

    let coordinate = match state.engine.resolve(&city).await {
        Ok(coordinate) => coordinate,
        Err(e) => return engine_error_response(&e),
    };

    let req = req.into_inner();
    let estate = NewEstate {
        price: req.price,
        year: req.year,
        month: req.month,
        day: req.day,
        time,
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        building_type: req.building_type,
        level: req.level,
        levels: req.levels,
        rooms: req.rooms,
        area: req.area,
        kitchen_area: req.kitchen_area,
        object_type: req.object_type,
        address: req.address,
        user_id: req.user_id,
    };

    match state.store.insert(estate).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => {
            tracing::error!("Failed to create estate: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to create estate",
                e.to_string(),
                500,
            ))
        }
    }
}
