//! Configuration loading from files and environment
//!
//! Sources, in order:
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/wppq/config.toml`
//! 3. Project config: `.wppq/config.toml`
//! 4. Environment variables: `WPPQ_*`

use std::path::{Path, PathBuf};

use tracing::debug;
use wppq_core::{Error, Result};

use super::types::{Config, ConfigFile};

/// Load configuration from all sources with hierarchy
///
/// # Errors
///
/// Returns `Error::Config` if:
/// - A config file is unreadable or malformed TOML
/// - An environment variable holds an invalid value
/// - The merged values fail validation
pub fn load_config() -> Result<Config> {
    let project = project_config_path()?;
    load_layers(
        global_config_path().as_deref(),
        &project,
        |key| std::env::var(key).ok(),
    )
}

/// Merge defaults, the two files (when present) and the environment
pub(super) fn load_layers(
    global: Option<&Path>,
    project: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let config = [global, Some(project)]
        .into_iter()
        .flatten()
        .filter(|path| path.exists())
        .try_fold(Config::default(), |config, path| {
            debug!(path = %path.display(), "Loading config file");
            load_toml_file(path).map(|file| config.merge(file))
        })?;

    let config = config.apply_env(env)?;
    config.validate()?;
    Ok(config)
}

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "wppq")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
///
/// # Errors
///
/// Returns error if current directory cannot be determined
pub fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join(".wppq").join("config.toml"))
        .map_err(|e| Error::config(format!("Failed to get current directory: {e}")))
}

/// Load a TOML file into a config layer
///
/// # Errors
///
/// Returns `Error::Config` if the path is a directory, cannot be read,
/// or is not valid TOML for the config layout
pub fn load_toml_file(path: &Path) -> Result<ConfigFile> {
    if path.is_dir() {
        return Err(Error::config(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::config(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

impl Config {
    /// Apply `WPPQ_*` overrides, reading variables through `env`
    fn apply_env(mut self, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = env("WPPQ_DATABASE_PATH") {
            self.database.path = PathBuf::from(value);
        }

        if let Some(value) = env("WPPQ_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_number("WPPQ_DATABASE_MAX_CONNECTIONS", &value)?;
        }

        if let Some(value) = env("WPPQ_MAX_REORDER_RETRIES") {
            self.engine.max_reorder_retries = parse_number("WPPQ_MAX_REORDER_RETRIES", &value)?;
        }

        if let Some(value) = env("WPPQ_LOG") {
            self.log.filter = value;
        }

        if let Some(value) = env("WPPQ_ACCOUNT_ID") {
            self.account.id = Some(value);
        }

        Ok(self)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("Invalid {key} value '{value}': {e}")))
}
