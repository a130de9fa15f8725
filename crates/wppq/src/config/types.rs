//! Configuration structure definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Resolved configuration, every layer applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
    pub log: LogConfig,
    pub account: AccountConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
    /// `SQLite` database file, relative paths resolve against the working directory
    pub path: PathBuf,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Extra attempts after a reorder hits a stale position
    pub max_reorder_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountConfig {
    /// Caller id used when `--account` is not given
    pub id: Option<String>,
}

/// One config file as written on disk; unset keys leave the lower layer alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseFile,
    #[serde(default)]
    pub engine: EngineFile,
    #[serde(default)]
    pub log: LogFile,
    #[serde(default)]
    pub account: AccountFile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseFile {
    pub path: Option<PathBuf>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineFile {
    pub max_reorder_retries: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogFile {
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountFile {
    pub id: Option<String>,
}
