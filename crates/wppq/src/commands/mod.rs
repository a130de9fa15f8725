//! Command implementations for the wppq CLI
//!
//! Each command runs against an [`App`] and returns plain data; rendering
//! to a table or JSON happens separately so the commands stay testable.

pub mod metrics;
pub mod phone;
pub mod queue;

use std::sync::Arc;

use serde::Serialize;
use wppq_core::{AccountId, EngineOptions, MetricsStore, PhoneRegistry, PhoneStore, QueueEngine};

/// Everything a command needs: the store, the registry and the caller
pub struct App<S: PhoneStore + MetricsStore + ?Sized> {
    store: Arc<S>,
    registry: PhoneRegistry<S>,
    account: AccountId,
}

impl<S: PhoneStore + MetricsStore + ?Sized> App<S> {
    pub fn new(store: Arc<S>, options: EngineOptions, account: AccountId) -> Self {
        let registry = PhoneRegistry::new(Arc::clone(&store), options);
        Self {
            store,
            registry,
            account,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub const fn registry(&self) -> &PhoneRegistry<S> {
        &self.registry
    }

    pub const fn engine(&self) -> &QueueEngine<S> {
        self.registry.engine()
    }

    pub const fn account(&self) -> &AccountId {
        &self.account
    }
}

/// Print a command result as JSON or through its human renderer
///
/// # Errors
///
/// Returns an error if the value cannot be serialized
pub fn emit<T: Serialize>(
    json: bool,
    value: &T,
    human: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", human(value));
    }
    Ok(())
}

/// Truncate a string to a maximum length
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    } else {
        s.to_string()
    }
}

/// `-` for missing optional values in tables
pub(crate) fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}
