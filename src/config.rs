//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const API_URL_ENV: &str = "TAREAS_API_URL";
pub const STORAGE_PATH_ENV: &str = "TAREAS_STORAGE_PATH";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL `{url}`: {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base address; requests go to `<api_url>/api/...`.
    pub api_url: String,
    /// File backing the durable session store.
    pub storage_path: PathBuf,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `TAREAS_API_URL`: default `http://127.0.0.1:5000`
    /// - `TAREAS_STORAGE_PATH`: default `$HOME/.tareas/storage.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if the API URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var(API_URL_ENV).unwrap_or_default();
        let storage_path = std::env::var_os(STORAGE_PATH_ENV).map(PathBuf::from);
        Self::resolve(Some(&api_url), storage_path)
    }

    /// Fill unset or empty values with defaults, then validate.
    ///
    /// The CLI passes its flags here after clap has merged in the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if the API URL is not an http(s) URL.
    pub fn resolve(api_url: Option<&str>, storage_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let api_url = api_url.filter(|url| !url.trim().is_empty()).unwrap_or(DEFAULT_API_URL);
        let storage_path = match storage_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => default_storage_path(std::env::var_os("HOME")),
        };
        Self::new(api_url, storage_path)
    }

    /// Validate and normalize explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if `api_url` is not an http(s) URL.
    pub fn new(api_url: &str, storage_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self { api_url: parse_api_url(api_url)?, storage_path: storage_path.into() })
    }
}

fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidApiUrl { url: raw.to_owned(), reason };

    let url = reqwest::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}

fn default_storage_path(home: Option<OsString>) -> PathBuf {
    match home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(".tareas").join("storage.json"),
        _ => PathBuf::from(".tareas-storage.json"),
    }
}
