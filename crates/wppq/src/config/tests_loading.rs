//! Loading-focused tests for configuration
//!
//! File parsing, layer precedence and environment overrides.

use std::{collections::HashMap, path::PathBuf};

use tempfile::TempDir;
use wppq_core::{Error, Result};

use super::{load::load_layers, load_toml_file, Config};

fn write(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    std::fs::write(&path, content)
        .map_err(|e| Error::config(format!("Failed to write test file: {e}")))?;
    Ok(path)
}

fn temp_dir() -> Result<TempDir> {
    TempDir::new().map_err(|e| Error::config(format!("Failed to create temp dir: {e}")))
}

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_no_config_files_returns_defaults() -> Result<()> {
    let dir = temp_dir()?;
    let config = load_layers(None, &dir.path().join("missing.toml"), env_of(&[]))?;
    assert_eq!(config, Config::default());
    Ok(())
}

#[test]
fn test_project_overrides_global() -> Result<()> {
    let dir = temp_dir()?;
    let global = write(
        &dir,
        "global.toml",
        "[database]\nmax_connections = 9\n\n[log]\nfilter = \"debug\"\n",
    )?;
    let project = write(&dir, "project.toml", "[database]\nmax_connections = 2\n")?;

    let config = load_layers(Some(&global), &project, env_of(&[]))?;
    assert_eq!(config.database.max_connections, 2);
    assert_eq!(config.log.filter, "debug");
    Ok(())
}

#[test]
fn test_env_overrides_files() -> Result<()> {
    let dir = temp_dir()?;
    let project = write(
        &dir,
        "project.toml",
        "[engine]\nmax_reorder_retries = 1\n\n[account]\nid = \"from_file\"\n",
    )?;

    let config = load_layers(
        None,
        &project,
        env_of(&[
            ("WPPQ_MAX_REORDER_RETRIES", "6"),
            ("WPPQ_ACCOUNT_ID", "from_env"),
            ("WPPQ_DATABASE_PATH", "/tmp/other.db"),
        ]),
    )?;
    assert_eq!(config.engine.max_reorder_retries, 6);
    assert_eq!(config.account.id.as_deref(), Some("from_env"));
    assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
    Ok(())
}

#[test]
fn test_invalid_env_number_is_config_error() -> Result<()> {
    let dir = temp_dir()?;
    let result = load_layers(
        None,
        &dir.path().join("missing.toml"),
        env_of(&[("WPPQ_DATABASE_MAX_CONNECTIONS", "many")]),
    );
    assert!(matches!(result, Err(Error::Config(_))));
    Ok(())
}

#[test]
fn test_env_values_are_validated() -> Result<()> {
    let dir = temp_dir()?;
    let result = load_layers(
        None,
        &dir.path().join("missing.toml"),
        env_of(&[("WPPQ_DATABASE_MAX_CONNECTIONS", "0")]),
    );
    assert!(matches!(result, Err(Error::Config(_))));
    Ok(())
}

#[test]
fn test_malformed_toml_returns_config_error() -> Result<()> {
    let dir = temp_dir()?;
    let path = write(&dir, "bad.toml", "[database\npath = ")?;
    let result = load_toml_file(&path);
    assert!(matches!(result, Err(Error::Config(ref msg)) if msg.contains("parse")));
    Ok(())
}

#[test]
fn test_unknown_keys_are_rejected() -> Result<()> {
    let dir = temp_dir()?;
    let path = write(&dir, "typo.toml", "[database]\nmax_conections = 3\n")?;
    assert!(matches!(load_toml_file(&path), Err(Error::Config(_))));
    Ok(())
}

#[test]
fn test_directory_is_not_a_config_file() -> Result<()> {
    let dir = temp_dir()?;
    assert!(matches!(load_toml_file(dir.path()), Err(Error::Config(_))));
    Ok(())
}
