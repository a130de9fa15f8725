//! Phone line types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{identity::AccountId, Error, Result};

/// Unique phone identifier, assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneId(String);

impl PhoneId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered WhatsApp phone line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub id: PhoneId,
    /// Owning account
    pub account_id: AccountId,
    pub number: String,
    pub name: String,
    pub online: bool,
    pub created_at: DateTime<Utc>,
    /// Last time `online` flipped in either direction
    pub last_online_change: Option<DateTime<Utc>>,
    /// Set when going online, cleared when going offline
    pub last_online: Option<DateTime<Utc>>,
    /// Set when going offline, cleared when going online
    pub last_offline: Option<DateTime<Utc>>,
    /// Soft-deleted phones are invisible to every operation
    pub deleted: bool,
}

impl Phone {
    #[must_use]
    pub fn is_owned_by(&self, account: &AccountId) -> bool {
        &self.account_id == account
    }

    /// Return a copy with the online flag and its timestamps updated
    #[must_use]
    pub fn with_online(mut self, online: bool, now: DateTime<Utc>) -> Self {
        self.online = online;
        self.last_online_change = Some(now);
        self.last_online = online.then_some(now);
        self.last_offline = (!online).then_some(now);
        self
    }

    /// Number rendered for display
    #[must_use]
    pub fn display_number(&self) -> String {
        format_number(&self.number)
    }
}

/// Fields for a phone about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhone {
    pub account_id: AccountId,
    pub number: String,
    pub name: String,
}

/// Normalize a phone number supplied by a user
///
/// # Errors
///
/// Returns `Error::Validation` if the number is empty after trimming
pub fn normalize_number(number: &str) -> Result<String> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Phone number is required"));
    }
    Ok(trimmed.to_string())
}

/// Format an 11-digit Brazilian mobile number as `(DD) D DDDD-DDDD`.
///
/// Non-digit characters are ignored when counting. Anything that is not
/// exactly 11 digits is returned unchanged.
#[must_use]
pub fn format_number(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 11 {
        return number.to_string();
    }
    format!(
        "({}) {} {}-{}",
        &digits[0..2],
        &digits[2..3],
        &digits[3..7],
        &digits[7..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("11987654321"), "(11) 9 8765-4321");
        assert_eq!(format_number("+55 (11) 98765-4321"), "+55 (11) 98765-4321");
        assert_eq!(format_number("(11) 98765-4321"), "(11) 9 8765-4321");
        assert_eq!(format_number("12345"), "12345");
        assert_eq!(format_number(""), "");
    }

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_number("  11987654321 "), Ok("11987654321".to_string()));
        assert!(matches!(normalize_number("   "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_with_online_timestamps() {
        let now = Utc::now();
        let phone = Phone {
            id: PhoneId::new("p-1"),
            account_id: AccountId::new("acct"),
            number: "11987654321".to_string(),
            name: "Support".to_string(),
            online: false,
            created_at: now,
            last_online_change: None,
            last_online: None,
            last_offline: None,
            deleted: false,
        };

        let online = phone.with_online(true, now);
        assert!(online.online);
        assert_eq!(online.last_online, Some(now));
        assert_eq!(online.last_offline, None);
        assert_eq!(online.last_online_change, Some(now));

        let offline = online.with_online(false, now);
        assert!(!offline.online);
        assert_eq!(offline.last_online, None);
        assert_eq!(offline.last_offline, Some(now));
    }
}
