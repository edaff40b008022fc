//! Application configuration management.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::sync::OnceLock;
use std::time::Duration;

/// Global configuration instance.
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the classification backend.
    pub classifier_url: String,
    /// Base URL of the catalog accounts service (token endpoint).
    pub accounts_url: String,
    /// Base URL of the catalog API (search endpoint).
    pub catalog_url: String,
    /// Catalog client identifier for token acquisition.
    pub client_id: String,
    /// Catalog client secret for token acquisition.
    pub client_secret: String,
    /// Result cap for interactive track search.
    pub search_limit: u8,
    /// Result cap for genre-scoped recommendation queries.
    pub recommend_limit: u8,
    /// Quiescence interval for the search debouncer, in milliseconds.
    pub debounce_ms: u64,
    /// Nominal duration of the simulated upload progress, in milliseconds.
    pub progress_duration_ms: u64,
    /// Tick interval of the simulated upload progress, in milliseconds.
    pub progress_tick_ms: u64,
    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json or pretty).
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable colored output.
    Pretty,
    /// JSON structured logging for production.
    Json,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a numeric variable is present but unparsable.
    pub fn from_env() -> Self {
        let classifier_url = std::env::var("CLASSIFIER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());

        let accounts_url = std::env::var("CATALOG_ACCOUNTS_URL")
            .unwrap_or_else(|_| "https://accounts.spotify.com".to_string());

        let catalog_url = std::env::var("CATALOG_API_URL")
            .unwrap_or_else(|_| "https://api.spotify.com".to_string());

        let client_id = std::env::var("CATALOG_CLIENT_ID").unwrap_or_default();
        let client_secret = std::env::var("CATALOG_CLIENT_SECRET").unwrap_or_default();

        let search_limit = std::env::var("SEARCH_LIMIT")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u8>()
            .expect("SEARCH_LIMIT must be a valid u8");

        let recommend_limit = std::env::var("RECOMMEND_LIMIT")
            .unwrap_or_else(|_| "40".to_string())
            .parse::<u8>()
            .expect("RECOMMEND_LIMIT must be a valid u8");

        let debounce_ms = std::env::var("SEARCH_DEBOUNCE_MS")
            .unwrap_or_else(|_| "500".to_string())
            .parse::<u64>()
            .expect("SEARCH_DEBOUNCE_MS must be a valid integer");

        let progress_duration_ms = std::env::var("PROGRESS_DURATION_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse::<u64>()
            .expect("PROGRESS_DURATION_MS must be a valid integer");

        let progress_tick_ms = std::env::var("PROGRESS_TICK_MS")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u64>()
            .expect("PROGRESS_TICK_MS must be a valid integer");

        let http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .expect("HTTP_TIMEOUT_SECS must be a valid integer");

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            classifier_url,
            accounts_url,
            catalog_url,
            client_id,
            client_secret,
            search_limit,
            recommend_limit,
            debounce_ms,
            progress_duration_ms,
            progress_tick_ms,
            http_timeout_secs,
            log_level,
            log_format,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns an error if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("CLASSIFIER_URL", &self.classifier_url),
            ("CATALOG_ACCOUNTS_URL", &self.accounts_url),
            ("CATALOG_API_URL", &self.catalog_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(name, value.clone()));
            }
        }

        for (name, value) in [
            ("SEARCH_DEBOUNCE_MS", self.debounce_ms),
            ("PROGRESS_DURATION_MS", self.progress_duration_ms),
            ("PROGRESS_TICK_MS", self.progress_tick_ms),
            ("HTTP_TIMEOUT_SECS", self.http_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval(name));
            }
        }

        if self.search_limit == 0 || self.recommend_limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }

        if self.client_id.is_empty() || self.client_secret.is_empty() {
            tracing::warn!(
                "Catalog credentials not set. Token acquisition will fail and \
                 catalog queries will be skipped."
            );
        }

        Ok(())
    }

    /// Quiescence interval for the search debouncer.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Nominal duration of the simulated upload progress.
    pub fn progress_duration(&self) -> Duration {
        Duration::from_millis(self.progress_duration_ms)
    }

    /// Tick interval of the simulated upload progress.
    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms)
    }

    /// HTTP request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not a valid http(s) URL: {1}")]
    InvalidUrl(&'static str, String),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("Result limits must be greater than zero")]
    ZeroLimit,
}

/// Initialize the global configuration.
///
/// Should be called once at application startup.
pub fn init() -> &'static Config {
    CONFIG.get_or_init(|| {
        dotenvy::dotenv().ok();
        Config::from_env()
    })
}
