//! API Configuration Module
//!
//! Listener address, CORS and pagination settings. Configuration is loaded
//! from environment variables with defaults suited to local development.

use std::net::SocketAddr;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// HTTP surface configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface the server binds to.
    pub host: String,

    /// Port the server listens on.
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Listing Configuration
    // ========================================================================
    /// `limit` used by instance listings when the query omits it.
    pub default_page_limit: u32,

    /// Upper bound accepted for `limit`.
    pub max_page_limit: u32,

    /// Apply the bundled schema when the server starts.
    pub apply_schema: bool,

    /// Expose `/metrics` for Prometheus scraping.
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8001,
            cors_origins: vec!["http://localhost:3000".to_string()],
            cors_max_age_secs: 86400,
            default_page_limit: 100,
            max_page_limit: 1000,
            apply_schema: false,
            metrics_enabled: true,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ALMA_API_HOST`: bind interface (default: 127.0.0.1)
    /// - `ALMA_API_PORT`: bind port (default: 8001)
    /// - `ALMA_CORS_ORIGINS`: comma-separated allowed origins (default: http://localhost:3000)
    /// - `ALMA_CORS_MAX_AGE_SECS`: preflight cache duration (default: 86400)
    /// - `ALMA_DEFAULT_PAGE_LIMIT`: listing page size (default: 100)
    /// - `ALMA_MAX_PAGE_LIMIT`: largest accepted page size (default: 1000)
    /// - `ALMA_APPLY_SCHEMA`: "true" to create tables at startup (default: false)
    /// - `ALMA_METRICS_ENABLED`: "false" or "0" hides /metrics (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("ALMA_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        let apply_schema = std::env::var("ALMA_APPLY_SCHEMA")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let metrics_enabled = std::env::var("ALMA_METRICS_ENABLED")
            .map(|s| s == "true" || s == "1")
            .unwrap_or(defaults.metrics_enabled);

        Self {
            host: std::env::var("ALMA_API_HOST").unwrap_or(defaults.host),
            port: env_parse("ALMA_API_PORT").unwrap_or(defaults.port),
            cors_origins,
            cors_max_age_secs: env_parse("ALMA_CORS_MAX_AGE_SECS")
                .unwrap_or(defaults.cors_max_age_secs),
            default_page_limit: env_parse("ALMA_DEFAULT_PAGE_LIMIT")
                .unwrap_or(defaults.default_page_limit),
            max_page_limit: env_parse("ALMA_MAX_PAGE_LIMIT").unwrap_or(defaults.max_page_limit),
            apply_schema,
            metrics_enabled,
        }
    }

    /// Socket address built from host and port.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }
        self.cors_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}
