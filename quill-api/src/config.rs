//! API server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

/// HTTP server configuration, read from the environment with safe
/// development defaults.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (default: 0.0.0.0)
    pub bind: String,

    /// Listen port (default: 5000)
    pub port: u16,

    /// Allowed CORS origins. Empty means development mode (allow all).
    pub cors_origins: Vec<String>,

    /// CORS preflight cache lifetime in seconds.
    pub cors_max_age_secs: u64,

    /// Optional directory to load `.xsd` schema files from. When unset,
    /// the schemas embedded in the binary are used.
    pub schema_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: Vec::new(),
            cors_max_age_secs: 3600,
            schema_dir: None,
        }
    }
}

impl ApiConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `QUILL_BIND`: bind address (default: 0.0.0.0)
    /// - `PORT`: listen port (default: 5000)
    /// - `QUILL_CORS_ORIGINS`: comma-separated allowed origins
    /// - `QUILL_CORS_MAX_AGE_SECS`: preflight cache lifetime (default: 3600)
    /// - `QUILL_SCHEMA_DIR`: directory of `.xsd` files overriding the
    ///   embedded schemas
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("QUILL_CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            bind: std::env::var("QUILL_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            cors_origins,
            cors_max_age_secs: std::env::var("QUILL_CORS_MAX_AGE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            schema_dir: std::env::var("QUILL_SCHEMA_DIR").ok().map(PathBuf::from),
        }
    }

    /// The socket address to bind the listener to.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 5000);
        assert!(config.cors_origins.is_empty());
        assert!(config.schema_dir.is_none());
        assert!(config.socket_addr().is_ok());
    }
}
