//! Server configuration from the environment.

use std::env;
use std::path::PathBuf;

use axum::http::HeaderValue;
use ootd_core::defaults::{
    CONFIG_PATH, DATA_DIR_NAME, DEFAULT_LANG, ENV_CONFIG_PATH, ENV_DATA_DIR, ENV_DEFAULT_LANG,
    SERVER_HOST, SERVER_PORT,
};

/// Process-level settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory uploaded images are stored in.
    pub data_dir: PathBuf,
    /// YAML file holding the vision module selection.
    pub vision_config_path: PathBuf,
    /// Answer language when a request names none.
    pub default_lang: String,
    /// CORS origin whitelist; empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: SERVER_HOST.to_string(),
            port: SERVER_PORT,
            data_dir: PathBuf::from(DATA_DIR_NAME),
            vision_config_path: PathBuf::from(CONFIG_PATH),
            default_lang: DEFAULT_LANG.to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load from environment variables.
    ///
    /// - `HOST`, `PORT`: bind address (default `0.0.0.0:8003`)
    /// - `OOTD_DATA_DIR`: image directory (default `./data`)
    /// - `OOTD_CONFIG`: vision config YAML (default `config.yaml`)
    /// - `OOTD_DEFAULT_LANG`: default answer language (default `en_US`)
    /// - `ALLOWED_ORIGINS`: comma-separated CORS origins (default: any)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            port: non_empty_var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: non_empty_var(ENV_DATA_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            vision_config_path: non_empty_var(ENV_CONFIG_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.vision_config_path),
            default_lang: non_empty_var(ENV_DEFAULT_LANG).unwrap_or(defaults.default_lang),
            allowed_origins: non_empty_var("ALLOWED_ORIGINS")
                .map(|s| split_origins(&s))
                .unwrap_or_default(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse origins into header values, dropping ones that are not valid headers.
pub fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8003");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.default_lang, "en_US");
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_split_origins() {
        let origins = split_origins("https://a.example, http://localhost:3000 ,,");
        assert_eq!(origins, vec!["https://a.example", "http://localhost:3000"]);
    }

    #[test]
    fn test_parse_allowed_origins_drops_invalid() {
        let origins = vec!["https://valid.com".to_string(), "bad\norigin".to_string()];
        let parsed = parse_allowed_origins(&origins);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].to_str().unwrap(), "https://valid.com");
    }
}
