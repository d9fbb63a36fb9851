//! Configuration loading for the Book Network client.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `BOOKNET_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, num::NonZeroU32, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::controller::FirstPageBehavior;

/// Largest page size the client will request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Application configuration derived from `BOOKNET_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_my_books_page_size")]
    pub my_books_page_size: u32,
    #[serde(default = "default_borrowed_page_size")]
    pub borrowed_page_size: u32,
    /// Whether navigating to the first page fetches it immediately.
    #[serde(default = "default_first_page_refetch")]
    pub first_page_refetch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_base_url: default_api_base_url(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            request_timeout_ms: default_request_timeout_ms(),
            my_books_page_size: default_my_books_page_size(),
            borrowed_page_size: default_borrowed_page_size(),
            first_page_refetch: default_first_page_refetch(),
            token: None,
            token_file: None,
        }
    }
}

impl AppConfig {
    /// Returns the parsed API base URL.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.api_base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn first_page_behavior(&self) -> FirstPageBehavior {
        if self.first_page_refetch {
            FirstPageBehavior::Refetch
        } else {
            FirstPageBehavior::CursorOnly
        }
    }

    /// Page size for the owned books screen.
    pub fn my_books_page_size(&self) -> NonZeroU32 {
        NonZeroU32::new(self.my_books_page_size).unwrap_or(NonZeroU32::MIN)
    }

    /// Page size for the borrowed books screen.
    pub fn borrowed_page_size(&self) -> NonZeroU32 {
        NonZeroU32::new(self.borrowed_page_size).unwrap_or(NonZeroU32::MIN)
    }

    /// Returns a redacted JSON representation (the token is redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.token.is_some() {
            config.token = Some("[REDACTED]".to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("MY_BOOKS_PAGE_SIZE", self.my_books_page_size),
            ("BORROWED_PAGE_SIZE", self.borrowed_page_size),
        ] {
            if value == 0 || value > MAX_PAGE_SIZE {
                return Err(ConfigError::InvalidPageSize { field, value });
            }
        }

        if !(100..=120_000).contains(&self.request_timeout_ms) {
            return Err(ConfigError::InvalidRequestTimeout {
                value: self.request_timeout_ms,
            });
        }

        match self.log_format.as_str() {
            "json" | "pretty" => {}
            other => {
                return Err(ConfigError::InvalidLogFormat {
                    value: other.to_string(),
                });
            }
        }

        self.base_url().map_err(|source| ConfigError::InvalidBaseUrl {
            value: self.api_base_url.clone(),
            source,
        })?;

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_base_url() -> String {
    "http://localhost:8088/api/v1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_my_books_page_size() -> u32 {
    4
}

fn default_borrowed_page_size() -> u32 {
    5
}

fn default_first_page_refetch() -> bool {
    true
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api base url '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("{field} must be between 1 and {max}, got {value}", max = MAX_PAGE_SIZE)]
    InvalidPageSize { field: &'static str, value: u32 },
    #[error("request timeout must be between 100 and 120000 milliseconds, got {value}")]
    InvalidRequestTimeout { value: u64 },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Loads [`AppConfig`] from layered env files and the process environment.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("BOOKNET_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_base_url = layered
            .remove("API_BASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_base_url);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let request_timeout_ms = parse_or(
            &mut layered,
            "REQUEST_TIMEOUT_MS",
            default_request_timeout_ms,
        )?;
        let my_books_page_size = parse_or(
            &mut layered,
            "MY_BOOKS_PAGE_SIZE",
            default_my_books_page_size,
        )?;
        let borrowed_page_size = parse_or(
            &mut layered,
            "BORROWED_PAGE_SIZE",
            default_borrowed_page_size,
        )?;
        let first_page_refetch = parse_or(
            &mut layered,
            "FIRST_PAGE_REFETCH",
            default_first_page_refetch,
        )?;
        let token = layered.remove("TOKEN").and_then(|val| {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        });
        let token_file = layered
            .remove("TOKEN_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let config = AppConfig {
            profile,
            api_base_url,
            log_level,
            log_format,
            request_timeout_ms,
            my_books_page_size,
            borrowed_page_size,
            first_page_refetch,
            token,
            token_file,
        };

        config.validate()?;
        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("BOOKNET_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("BOOKNET_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_or<T: std::str::FromStr>(
    layered: &mut BTreeMap<String, String>,
    key: &'static str,
    default: fn() -> T,
) -> Result<T, ConfigError> {
    match layered.remove(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            trimmed
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value: raw })
        }
        None => Ok(default()),
    }
}
