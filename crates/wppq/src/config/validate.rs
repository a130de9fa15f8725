//! Configuration validation

use super::types::Config;
use wppq_core::{Error, Result};

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any value is out of range or blank
    pub fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(Error::config("database.path cannot be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(Error::config("database.max_connections must be at least 1"));
        }

        if self
            .account
            .id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(Error::config(
                "account.id cannot be blank - either unset it or provide an account id",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_connections() {
        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_empty_path() {
        let mut config = Config::default();
        config.database.path = PathBuf::new();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_blank_account() {
        let mut config = Config::default();
        config.account.id = Some("   ".to_string());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
