use crate::data::DEFAULT_BASE_URL;
use crate::error::ConfigError;
use crate::indicators::IndicatorConfig;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub lookback_days: u32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub log_level: String,
    pub indicators: IndicatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            lookback_days: 30,
            request_timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 500,
            log_level: "info".to_string(),
            indicators: IndicatorConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn sanitized(mut self) -> Self {
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = DEFAULT_BASE_URL.to_string();
        }

        self.lookback_days = self.lookback_days.clamp(1, 365);
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 120);
        self.max_retries = self.max_retries.min(5);
        self.retry_backoff_ms = self.retry_backoff_ms.min(10_000);
        self.indicators = self.indicators.sanitized();
        self
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".weiscreener.json")
}

/// Reads the config file. A missing file gives the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    serde_json::from_str::<AppConfig>(&contents)
        .map(AppConfig::sanitized)
        .map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
}
