//! Caller identity for the command line
//!
//! The account comes from `--account`, or else from `account.id` in the
//! resolved config (which already folds in `WPPQ_ACCOUNT_ID`).

use wppq_core::{AccountId, Error, IdentityProvider, Result};

use crate::config::Config;

/// Identity resolved once from flags and config
#[derive(Debug, Clone)]
pub struct CliIdentity {
    account: Option<String>,
}

impl CliIdentity {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            account: config.account.id.clone(),
        }
    }
}

impl IdentityProvider for CliIdentity {
    fn current_account(&self) -> Result<AccountId> {
        self.account
            .as_deref()
            .ok_or_else(|| {
                Error::unauthorized("No account configured; pass --account or set WPPQ_ACCOUNT_ID")
            })
            .and_then(AccountId::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_from_config() -> Result<()> {
        let config = Config::default().with_overrides(None, Some("user_owner".to_string()));
        let account = CliIdentity::from_config(&config).current_account()?;
        assert_eq!(account.as_str(), "user_owner");
        Ok(())
    }

    #[test]
    fn test_missing_account_is_unauthorized() {
        let identity = CliIdentity::from_config(&Config::default());
        assert!(matches!(identity.current_account(), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_blank_account_is_unauthorized() {
        let config = Config::default().with_overrides(None, Some("  ".to_string()));
        let identity = CliIdentity::from_config(&config);
        assert!(matches!(identity.current_account(), Err(Error::Unauthorized(_))));
    }
}
