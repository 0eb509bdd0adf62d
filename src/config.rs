use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    pub search: SearchSettings,
    pub prediction: PredictionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

/// Geocode cache; Redis is optional and the service runs on L1 alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderSettings {
    pub endpoint: String,
    pub user_agent: String,
    #[serde(default = "default_geocoder_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_geocoder_language")]
    pub language: String,
}

fn default_geocoder_timeout() -> u64 { 10 }
fn default_geocoder_language() -> String { "ru".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_geo_delta")]
    pub geo_delta: f64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            geo_delta: default_geo_delta(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_geo_delta() -> f64 { crate::core::DEFAULT_GEO_DELTA }
fn default_limit() -> usize { 50 }
fn default_max_limit() -> usize { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionSettings {
    pub model_path: String,
    #[serde(default = "default_monetary_unit")]
    pub monetary_unit: f64,
    /// Per-feature imputation overrides keyed by feature name
    #[serde(default)]
    pub defaults: HashMap<String, f64>,
}

fn default_monetary_unit() -> f64 { crate::core::MONETARY_UNIT }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingSettings {
    /// Multi-line human output; anything else logs one compact line per event
    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with ESTATE__)
    /// 4. `DATABASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ESTATE__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        with_database_url(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        with_database_url(settings)?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("ESTATE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Let the conventional `DATABASE_URL` win over file and prefixed values
fn with_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_search_settings() {
        let search = SearchSettings::default();
        assert_eq!(search.geo_delta, 0.4);
        assert_eq!(search.default_limit, 50);
        assert_eq!(search.max_limit, 100);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
        assert!(!LoggingSettings::default().is_pretty());
    }

    #[test]
    fn test_load_from_file_with_overrides() {
        let path = std::env::temp_dir().join(format!("estate-engine-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
url = "postgres://localhost/test"

[geocoder]
endpoint = "http://localhost:8088"
user_agent = "test"

[prediction]
model_path = "model.json"

[prediction.defaults]
rooms = 2.0

[logging]
format = "Pretty"
"#
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.search.geo_delta, 0.4);
        assert_eq!(settings.prediction.monetary_unit, 1_000_000.0);
        assert_eq!(settings.prediction.defaults.get("rooms"), Some(&2.0));
        assert!(settings.cache.redis_url.is_none());
        assert_eq!(settings.geocoder.timeout_secs, 10);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.logging.is_pretty());
    }
}
