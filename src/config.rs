//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === CORS Policy ===
    /// Comma-separated origin allow-list, or `*` for any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    // === Deployment ===
    /// Environment name reported in the health payload.
    #[serde(default = "default_node_env")]
    pub node_env: String,

    /// Port to bind the HTTP server on (also reported in the payload).
    #[serde(default = "default_port")]
    pub port: u16,

    // === Hosted Backend ===
    /// Base URL of the hosted Manifest-style backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Application identifier sent as `X-App-ID` on outgoing calls.
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Connection probe attempts before giving up.
    #[serde(default = "default_probe_retries")]
    pub probe_retries: u32,

    // === HTTP Client Tuning ===
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Connection pool size per host.
    #[serde(default = "default_http_pool_size")]
    pub http_pool_size: usize,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_allowed_origins() -> String {
    "*".to_string()
}

fn default_node_env() -> String {
    "production".to_string()
}

fn default_port() -> u16 {
    1111
}

fn default_backend_url() -> String {
    "http://localhost:1111".to_string()
}

fn default_app_id() -> String {
    "plateperfect".to_string()
}

fn default_probe_retries() -> u32 {
    3
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_http_pool_size() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.backend_url.is_empty() {
            return Err("BACKEND_URL must not be empty".to_string());
        }

        if url::Url::parse(&self.backend_url).is_err() {
            return Err(format!("BACKEND_URL is not a valid URL: {}", self.backend_url));
        }

        if self.probe_retries == 0 {
            return Err("PROBE_RETRIES must be at least 1".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be nonzero".to_string());
        }

        Ok(())
    }

    /// Backend base URL with any trailing slash removed.
    pub fn backend_url_trimmed(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            allowed_origins: default_allowed_origins(),
            node_env: default_node_env(),
            port: default_port(),
            backend_url: default_backend_url(),
            app_id: default_app_id(),
            probe_retries: default_probe_retries(),
            http_timeout_ms: default_http_timeout_ms(),
            http_pool_size: default_http_pool_size(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_allowed_origins(), "*");
        assert_eq!(default_node_env(), "production");
        assert_eq!(default_port(), 1111);
        assert_eq!(default_probe_retries(), 3);
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_backend_url() {
        let mut config = base_config();
        config.backend_url = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_malformed_backend_url() {
        let mut config = base_config();
        config.backend_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_probe_retries() {
        let mut config = base_config();
        config.probe_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn backend_url_trimmed_strips_trailing_slash() {
        let mut config = base_config();
        config.backend_url = "http://localhost:1111/".to_string();
        assert_eq!(config.backend_url_trimmed(), "http://localhost:1111");
    }
}
