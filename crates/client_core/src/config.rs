use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const SETTINGS_FILE: &str = "survey_client.toml";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

/// Defaults, then `survey_client.toml` in the working directory, then the
/// process environment.
pub fn load_settings() -> Settings {
    Settings::default()
        .merge_file(Path::new(SETTINGS_FILE))
        .merge_env(|name| std::env::var(name).ok())
}

impl Settings {
    pub fn merge_file(self, path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => self.merge_toml(&raw),
            Err(_) => self,
        }
    }

    pub fn merge_toml(mut self, raw: &str) -> Self {
        let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => file_cfg,
            Err(err) => {
                tracing::warn!("ignoring malformed {SETTINGS_FILE}: {err}");
                return self;
            }
        };
        if let Some(v) = file_cfg.get("api_base_url") {
            self.api_base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("log_filter") {
            self.log_filter = v.clone();
        }
        self
    }

    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(v) = non_empty("SURVEY_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = non_empty("APP__API_BASE_URL") {
            self.api_base_url = v;
        }

        if let Some(v) = non_empty("SURVEY_LOG") {
            self.log_filter = v;
        }
        if let Some(v) = non_empty("APP__LOG_FILTER") {
            self.log_filter = v;
        }
        self
    }

    pub fn with_api_base_url(mut self, api_base_url: Option<String>) -> Self {
        if let Some(v) = api_base_url {
            self.api_base_url = v;
        }
        self
    }
}

/// Checks that `raw` is an absolute http(s) URL and returns it without a
/// trailing slash, ready to have `/v1/...` appended.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|source| ClientError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason: source.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
