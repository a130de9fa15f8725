//! Configuration merging logic
//!
//! Later layers override earlier ones (defaults → global → project → env → CLI).
//! Every merge returns a new instance.

use std::path::PathBuf;

use super::types::{
    AccountConfig, AccountFile, Config, ConfigFile, DatabaseConfig, DatabaseFile, EngineConfig,
    EngineFile, LogConfig, LogFile,
};

impl Config {
    /// Lay a config file over this config; keys the file sets win
    #[must_use]
    pub fn merge(self, file: ConfigFile) -> Self {
        Self {
            database: self.database.merge(file.database),
            engine: self.engine.merge(file.engine),
            log: self.log.merge(file.log),
            account: self.account.merge(file.account),
        }
    }

    /// Apply CLI flag overrides
    #[must_use]
    pub fn with_overrides(mut self, db: Option<PathBuf>, account: Option<String>) -> Self {
        if let Some(path) = db {
            self.database.path = path;
        }
        if let Some(id) = account {
            self.account.id = Some(id);
        }
        self
    }
}

impl DatabaseConfig {
    fn merge(self, other: DatabaseFile) -> Self {
        Self {
            path: other.path.unwrap_or(self.path),
            max_connections: other.max_connections.unwrap_or(self.max_connections),
        }
    }
}

impl EngineConfig {
    fn merge(self, other: EngineFile) -> Self {
        Self {
            max_reorder_retries: other.max_reorder_retries.unwrap_or(self.max_reorder_retries),
        }
    }
}

impl LogConfig {
    fn merge(self, other: LogFile) -> Self {
        Self {
            filter: other.filter.unwrap_or(self.filter),
        }
    }
}

impl AccountConfig {
    fn merge(self, other: AccountFile) -> Self {
        Self {
            id: other.id.or(self.id),
        }
    }
}
