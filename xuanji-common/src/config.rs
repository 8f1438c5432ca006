//! Configuration file discovery, TOML loading and secret resolution
//!
//! Bootstrap configuration is read once at startup. Resolution follows a fixed
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/xuanji/<module>.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable config file never stops startup: the caller gets
//! the compiled defaults and a warning is logged.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locate the TOML config file for a module
///
/// **Priority:** CLI argument → environment variable → platform config dir.
/// Returns `None` when no candidate exists on disk; an explicit CLI or
/// environment path is returned even if missing so the loader can warn about it.
pub fn config_file_path(
    module_name: &str,
    cli_arg: Option<&Path>,
    env_var_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    let user_config = dirs::config_dir().map(|d| d.join("xuanji").join(format!("{}.toml", module_name)));
    match user_config {
        Some(path) if path.exists() => Some(path),
        _ => None,
    }
}

/// Load a TOML config file, falling back to defaults when it is missing
///
/// **Behavior:**
/// - `None` path → defaults
/// - path does not exist → warning + defaults
/// - file exists but fails to parse → `Error::Config`
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded config file {}", path.display());
    Ok(config)
}

/// Validate a secret value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve a secret from an ordered list of `(source name, value)` candidates
///
/// The first valid candidate wins. A warning names every source when more
/// than one carries a valid value.
pub fn resolve_secret(
    secret_name: &str,
    candidates: &[(&'static str, Option<String>)],
) -> Option<(String, &'static str)> {
    let valid: Vec<(&'static str, &String)> = candidates
        .iter()
        .filter_map(|(source, value)| {
            value
                .as_ref()
                .filter(|v| is_valid_key(v))
                .map(|v| (*source, v))
        })
        .collect();

    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            secret_name,
            sources.join(", "),
            sources[0]
        );
    }

    valid.first().map(|(source, value)| {
        info!("{} loaded from {}", secret_name, source);
        (value.trim().to_string(), *source)
    })
}
