//! Default value implementations

use std::path::PathBuf;

use super::types::{DatabaseConfig, EngineConfig, LogConfig};

pub(super) const DEFAULT_DB_PATH: &str = ".wppq/wppq.db";
pub(super) const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub(super) const DEFAULT_MAX_REORDER_RETRIES: u32 = 3;
pub(super) const DEFAULT_LOG_FILTER: &str = "warn";

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_reorder_retries: DEFAULT_MAX_REORDER_RETRIES,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
