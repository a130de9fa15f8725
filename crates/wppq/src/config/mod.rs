//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/wppq/config.toml`
//! 3. Project config: `.wppq/config.toml`
//! 4. Environment variables: `WPPQ_*`
//! 5. CLI flags (`--db`, `--account`)
//!
//! # Example Config
//!
//! ```toml
//! [database]
//! path = "/var/lib/wppq/wppq.db"
//! max_connections = 8
//!
//! [engine]
//! max_reorder_retries = 5
//!
//! [log]
//! filter = "wppq=info"
//!
//! [account]
//! id = "user_owner"
//! ```

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;

pub use load::{global_config_path, load_config, load_toml_file, project_config_path};
pub use types::{
    AccountConfig, AccountFile, Config, ConfigFile, DatabaseConfig, DatabaseFile, EngineConfig,
    EngineFile, LogConfig, LogFile,
};
