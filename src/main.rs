use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use estate_engine::config::{LoggingSettings, Settings};
use estate_engine::core::{Engine, FeatureDefaults, FilterPredicateBuilder, ResultPager, TreeEnsembleModel};
use estate_engine::routes::{self, AppState};
use estate_engine::services::{CacheManager, CachedResolver, NominatimClient, PostgresClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors, e.g. a non-numeric user id
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path parameter: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

/// `RUST_LOG` wins over the configured level when set
fn init_tracing(logging: &LoggingSettings) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)))
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; no subscriber exists yet, so failures go to stderr
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, format!("Failed to load configuration: {}", e))
    })?;

    init_tracing(&settings.logging);

    info!("Starting estate engine...");
    info!("Configuration loaded successfully");

    // Imputation means, with any configured overrides
    let defaults = FeatureDefaults::historical()
        .with_overrides(&settings.prediction.defaults)
        .map_err(|e| startup_error("Invalid prediction defaults", e))?;

    let model = TreeEnsembleModel::from_path(&settings.prediction.model_path)
        .map_err(|e| startup_error("Failed to load price model", e))?;

    info!(
        "Price model loaded from {} ({} trees)",
        settings.prediction.model_path,
        model.num_trees()
    );

    // Initialize cache manager (Redis is optional)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(86_400);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to connect to Redis ({}), caching geocodes in-process only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => CacheManager::in_memory(l1_cache_size, cache_ttl),
    };

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, Redis: {})",
        l1_cache_size,
        cache_ttl,
        if cache.has_redis() { "on" } else { "off" }
    );

    // Geocoder behind the cache
    let geocoder = NominatimClient::new(
        settings.geocoder.endpoint.clone(),
        settings.geocoder.user_agent.clone(),
        settings.geocoder.language.clone(),
        Duration::from_secs(settings.geocoder.timeout_secs),
    )
    .map_err(|e| startup_error("Failed to build geocoder client", e))?;

    let resolver = CachedResolver::new(geocoder, Arc::new(cache));

    info!("Geocoder initialized ({})", settings.geocoder.endpoint);

    // Initialize PostgreSQL client
    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
    )
    .await
    .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

    info!("PostgreSQL client initialized");

    let engine = Engine::new(
        defaults,
        FilterPredicateBuilder::new(settings.search.geo_delta),
        Arc::new(model),
        Arc::new(resolver),
        settings.prediction.monetary_unit,
    );

    // Build application state
    let app_state = AppState {
        engine: Arc::new(engine),
        store: Arc::new(postgres),
        pager: ResultPager::new(settings.search.default_limit, settings.search.max_limit),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
