use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const API_URL_ENV: &str = "TASKBOARD_API_URL";
pub const LOG_FILE_ENV: &str = "TASKBOARD_LOG_FILE";

/// Runtime settings for the board client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// API root without a trailing slash.
    pub api_url: String,
    pub log_file: PathBuf,
}

impl AppConfig {
    /// Read settings from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_values(env::var(API_URL_ENV).ok(), env::var(LOG_FILE_ENV).ok())
    }

    /// Build from optional raw values, falling back to defaults.
    pub fn from_values(
        api_url: Option<String>,
        log_file: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_url = match api_url.filter(|v| !v.trim().is_empty()) {
            Some(raw) => normalize_api_url(&raw)?,
            None => DEFAULT_API_URL.to_string(),
        };
        let log_file = log_file
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_log_file);
        Ok(Self { api_url, log_file })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        log_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = api_url {
            self.api_url = normalize_api_url(raw)?;
        }
        if let Some(path) = log_file {
            self.log_file = path;
        }
        Ok(self)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_file: default_log_file(),
        }
    }
}

fn default_log_file() -> PathBuf {
    env::temp_dir().join("taskboard.log")
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = reqwest::Url::parse(trimmed).map_err(|e| ConfigError::InvalidApiUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_values(None, None).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.log_file.ends_with("taskboard.log"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_values(Some("  ".into()), Some(String::new())).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[rstest]
    #[case("https://tasks.example.com/api/", "https://tasks.example.com/api")]
    #[case("http://127.0.0.1:9000", "http://127.0.0.1:9000")]
    fn api_url_is_normalized(#[case] raw: &str, #[case] expected: &str) {
        let config = AppConfig::from_values(Some(raw.into()), None).unwrap();
        assert_eq!(config.api_url, expected);
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://example.com/api")]
    fn invalid_api_url_is_rejected(#[case] raw: &str) {
        let err = AppConfig::from_values(Some(raw.into()), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = AppConfig::default()
            .with_overrides(Some("http://remote:1/api"), Some(PathBuf::from("/tmp/x.log")))
            .unwrap();
        assert_eq!(config.api_url, "http://remote:1/api");
        assert_eq!(config.log_file, PathBuf::from("/tmp/x.log"));
    }
}
