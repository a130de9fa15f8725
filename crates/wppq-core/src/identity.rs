//! Caller identity
//!
//! The account id comes from an external identity provider and is trusted
//! as given. Resolving it is an injected capability.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Opaque authenticated-account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account ID, rejecting blank values
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the id is empty or whitespace-only
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::unauthorized("No authenticated account"));
        }
        Ok(Self(id))
    }

    /// Create an account ID without validation
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves the account making the current request
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` when no caller is authenticated
    fn current_account(&self) -> Result<AccountId>;
}

/// Identity provider that always answers with the same account
#[derive(Debug, Clone)]
pub struct StaticIdentity(Option<AccountId>);

impl StaticIdentity {
    #[must_use]
    pub const fn new(account: AccountId) -> Self {
        Self(Some(account))
    }

    /// Provider with no authenticated caller
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_account(&self) -> Result<AccountId> {
        self.0
            .clone()
            .ok_or_else(|| Error::unauthorized("No authenticated account"))
    }
}
