//! Bootstrap configuration for xuanji-oracle
//!
//! **Priority:**
//! - host/port: CLI (or its env var) → TOML → default
//! - Gemini API key: `XUANJI_GEMINI_API_KEY` → `GEMINI_API_KEY` → `API_KEY` → TOML
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 5780
//!
//! [logging]
//! level = "info"
//!
//! [gemini]
//! api_key = "..."
//! model = "gemini-2.5-flash"
//! image_model = "gemini-2.5-flash-image"
//! request_timeout_secs = 60
//!
//! [chart]
//! true_solar_time = true
//! zi_hour_mode = "same_day"
//! ```

use crate::inference::gemini::{
    GeminiSettings, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use xuanji_almanac::ChartOptions;
use xuanji_common::config::{config_file_path, load_toml_config, resolve_secret, LoggingConfig};
use xuanji_common::Result;

pub const MODULE_NAME: &str = "xuanji-oracle";
pub const CONFIG_ENV_VAR: &str = "XUANJI_CONFIG";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;

/// Environment variables checked for the Gemini key, highest priority first
pub const API_KEY_ENV_VARS: [&str; 3] = ["XUANJI_GEMINI_API_KEY", "GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    /// Text model
    pub model: Option<String>,
    pub image_model: Option<String>,
    pub base_url: Option<String>,
    /// 0 or absent: no local timeout
    pub request_timeout_secs: Option<u64>,
}

/// Contents of `xuanji-oracle.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub chart: ChartOptions,
}

impl TomlConfig {
    /// Discover and load the config file; missing file gives defaults
    pub fn load(cli_path: Option<&Path>) -> Result<(TomlConfig, Option<PathBuf>)> {
        let path = config_file_path(MODULE_NAME, cli_path, CONFIG_ENV_VAR);
        let config = load_toml_config(path.as_deref())?;
        Ok((config, path))
    }

    pub fn bind_host(&self, cli_host: Option<String>) -> String {
        cli_host
            .or_else(|| self.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn bind_port(&self, cli_port: Option<u16>) -> u16 {
        cli_port.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    /// Resolve the Gemini key from the environment and this file
    pub fn resolve_api_key(&self) -> Option<String> {
        let mut candidates: Vec<(&'static str, Option<String>)> = API_KEY_ENV_VARS
            .iter()
            .map(|&name| (name, std::env::var(name).ok()))
            .collect();
        candidates.push(("TOML", self.gemini.api_key.clone()));

        resolve_secret("Gemini API key", &candidates).map(|(key, _source)| key)
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        let or_default = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        GeminiSettings {
            api_key: self.resolve_api_key(),
            base_url: or_default(&self.gemini.base_url, DEFAULT_BASE_URL),
            text_model: or_default(&self.gemini.model, DEFAULT_TEXT_MODEL),
            image_model: or_default(&self.gemini.image_model, DEFAULT_IMAGE_MODEL),
            request_timeout: self
                .gemini
                .request_timeout_secs
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
        }
    }
}
