//! # Gateway Configuration
//!
//! Server and routing configuration, loaded from a JSON file. Every field
//! has a default so a missing or partial file still yields a runnable
//! configuration.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins (default: empty, meaning permissive)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Mount prefix for the REST surface (default: "rest")
    #[serde(default = "default_mount")]
    pub mount: String,

    /// Per-table identifying-column overrides (default: quizzes -> slug)
    #[serde(default = "default_primary_keys")]
    pub primary_keys: HashMap<String, String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_mount() -> String {
    "rest".to_string()
}

fn default_primary_keys() -> HashMap<String, String> {
    HashMap::from([("quizzes".to_string(), "slug".to_string())])
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            mount: default_mount(),
            primary_keys: default_primary_keys(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
        assert_eq!(config.mount, "rest");
        assert_eq!(config.primary_keys.get("quizzes").unwrap(), "slug");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"port\": 9000, \"mount\": \"api\"}}").unwrap();

        let config = GatewayConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.mount, "api");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.primary_keys.get("quizzes").unwrap(), "slug");
    }

    #[test]
    fn test_primary_key_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{{\"primary_keys\": {{\"articles\": \"permalink\"}}}}"
        )
        .unwrap();

        let config = GatewayConfig::load(file.path()).unwrap();
        assert_eq!(config.primary_keys.get("articles").unwrap(), "permalink");
        assert!(!config.primary_keys.contains_key("quizzes"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            GatewayConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            GatewayConfig::load(Path::new("/nonexistent/restgate.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
