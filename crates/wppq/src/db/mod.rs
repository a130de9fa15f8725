//! `SQLite` persistence for phones, queues and attendance metrics
//!
//! Implements the storage traits from `wppq_core`:
//! - Connection pooling via `SqlitePool`
//! - Simple embedded schema (no migration files)
//! - Reorders applied in a single transaction, guarded per row

use std::path::Path;

use sqlx::SqlitePool;
use tracing::debug;
use wppq_core::{Error, Result};

mod phone_ops;
mod query;
mod queue_ops;
mod schema;

/// Store backed by a `SQLite` database file
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database at `path`, creating the file, its parent
    /// directory and the schema as needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Collaborator` if the directory or database cannot
    /// be created, or the schema cannot be initialized
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::collaborator(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let db_url = format!("sqlite:{}", path.display());
        let pool = schema::create_connection_pool(&db_url, max_connections).await?;
        schema::init_schema(&pool).await?;
        debug!(path = %path.display(), "Opened database");
        Ok(Self { pool })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;
    use tokio_test::block_on;
    use wppq_core::{
        metrics, AccountId, Direction, EngineOptions, MetricsStore, PhoneRegistry, PhoneStore,
        PositionChange, QueueStore,
    };

    use super::*;

    async fn setup_test_db() -> Result<(Arc<SqliteStore>, TempDir)> {
        let dir = TempDir::new().map_err(|e| Error::collaborator(e.to_string()))?;
        let store = SqliteStore::open(&dir.path().join("nested").join("test.db"), 2).await?;
        Ok((Arc::new(store), dir))
    }

    fn positions(entries: &[wppq_core::QueueEntry]) -> Vec<(String, u32)> {
        wppq_core::queue::sort_active(entries)
            .into_iter()
            .map(|e| (e.id.to_string(), e.position))
            .collect()
    }

    #[test]
    fn test_phone_round_trip() -> Result<()> {
        block_on(async {
            let (store, _dir) = setup_test_db().await?;
            let registry = PhoneRegistry::new(Arc::clone(&store), EngineOptions::default());
            let account = AccountId::new("acct");

            let phone = registry.register("11987654321", "Support", &account).await?;
            let change = registry.set_online(&phone.id, true, &account).await?;
            assert!(change.enqueued.is_some());

            let stored = store
                .get_phone(&phone.id)
                .await?
                .ok_or_else(|| Error::not_found("phone"))?;
            assert!(stored.online);
            assert_eq!(stored.name, "Support");
            assert!(stored.last_online.is_some());
            assert!(stored.last_offline.is_none());
            assert_eq!(
                store.find_phone_by_number("11987654321").await?.map(|p| p.id),
                Some(phone.id)
            );
            Ok(())
        })
    }

    #[test]
    fn test_removed_phone_is_hidden() -> Result<()> {
        block_on(async {
            let (store, _dir) = setup_test_db().await?;
            let registry = PhoneRegistry::new(Arc::clone(&store), EngineOptions::default());
            let account = AccountId::new("acct");

            let phone = registry.register("11987654321", "", &account).await?;
            registry.remove(&phone.id, &account).await?;

            assert!(store.list_phones(&account).await?.is_empty());
            assert!(store.find_phone_by_number("11987654321").await?.is_none());
            // The number can be registered again
            registry.register("11987654321", "", &account).await?;
            Ok(())
        })
    }

    #[test]
    fn test_reorder_persists_contiguous_positions() -> Result<()> {
        block_on(async {
            let (store, _dir) = setup_test_db().await?;
            let registry = PhoneRegistry::new(Arc::clone(&store), EngineOptions::default());
            let account = AccountId::new("acct");
            let phone = registry.register("11987654321", "", &account).await?;
            registry.set_online(&phone.id, true, &account).await?;
            let engine = registry.engine();
            engine.push(&phone.id, &account).await?;
            engine.push(&phone.id, &account).await?;

            let before = positions(&store.find_active_entries(&phone.id).await?);
            let first = wppq_core::EntryId::new(before[0].0.clone());
            engine
                .reorder(&first, &phone.id, Direction::Bottom, &account)
                .await?;

            let after = positions(&store.find_active_entries(&phone.id).await?);
            assert_eq!(
                after,
                vec![
                    (before[1].0.clone(), 1),
                    (before[2].0.clone(), 2),
                    (before[0].0.clone(), 3),
                ]
            );
            Ok(())
        })
    }

    #[test]
    fn test_stale_batch_rolls_back() -> Result<()> {
        block_on(async {
            let (store, _dir) = setup_test_db().await?;
            let registry = PhoneRegistry::new(Arc::clone(&store), EngineOptions::default());
            let account = AccountId::new("acct");
            let phone = registry.register("11987654321", "", &account).await?;
            registry.set_online(&phone.id, true, &account).await?;
            registry.engine().push(&phone.id, &account).await?;

            let before = positions(&store.find_active_entries(&phone.id).await?);
            let changes = vec![
                PositionChange {
                    entry_id: wppq_core::EntryId::new(before[0].0.clone()),
                    from: 1,
                    to: 2,
                },
                PositionChange {
                    entry_id: wppq_core::EntryId::new(before[1].0.clone()),
                    from: 5,
                    to: 1,
                },
            ];

            let result = store.apply_position_changes(&phone.id, &changes).await;
            assert!(matches!(result, Err(Error::Conflict(_))));
            assert_eq!(positions(&store.find_active_entries(&phone.id).await?), before);
            Ok(())
        })
    }

    #[test]
    fn test_attendance_upsert() -> Result<()> {
        block_on(async {
            let (store, _dir) = setup_test_db().await?;
            let registry = PhoneRegistry::new(Arc::clone(&store), EngineOptions::default());
            let account = AccountId::new("acct");
            let phone = registry.register("11987654321", "", &account).await?;
            let now = chrono::Utc::now();

            metrics::record_attendance(store.as_ref(), &phone.id, 2.0, now).await?;
            metrics::record_attendance(store.as_ref(), &phone.id, 4.0, now).await?;

            let stored = store
                .get_attendance(&phone.id)
                .await?
                .ok_or_else(|| Error::not_found("metrics"))?;
            assert_eq!(stored.total_attendances, 2);
            assert_eq!(stored.today_attendances, 2);
            assert!((stored.average_wait_minutes - 3.0).abs() < 1e-9);
            Ok(())
        })
    }

    #[test]
    fn test_returned_values_match_stored_rows() -> Result<()> {
        block_on(async {
            let (store, _dir) = setup_test_db().await?;
            let registry = PhoneRegistry::new(Arc::clone(&store), EngineOptions::default());
            let account = AccountId::new("acct");
            let phone = registry.register("11987654321", "Support", &account).await?;
            let change = registry.set_online(&phone.id, true, &account).await?;

            let enqueued = change
                .enqueued
                .ok_or_else(|| Error::not_found("enqueued entry"))?;
            assert_eq!(store.get_entry(&phone.id, &enqueued.id).await?, Some(enqueued));
            assert_eq!(store.get_phone(&phone.id).await?, Some(change.phone));
            Ok(())
        })
    }

    #[test]
    fn test_update_entry_position_round_trip() -> Result<()> {
        block_on(async {
            let (store, _dir) = setup_test_db().await?;
            let registry = PhoneRegistry::new(Arc::clone(&store), EngineOptions::default());
            let account = AccountId::new("acct");
            let phone = registry.register("11987654321", "", &account).await?;
            let entry = registry
                .set_online(&phone.id, true, &account)
                .await?
                .enqueued
                .ok_or_else(|| Error::not_found("enqueued entry"))?;

            store.update_entry_position(&entry.id, 7).await?;
            let stored = store
                .get_entry(&phone.id, &entry.id)
                .await?
                .ok_or_else(|| Error::not_found("entry"))?;
            assert_eq!(stored.position, 7);

            let missing = store
                .update_entry_position(&wppq_core::EntryId::new("9999"), 1)
                .await;
            assert!(matches!(missing, Err(Error::NotFound(_))));
            Ok(())
        })
    }

    #[test]
    fn test_foreign_ids_are_not_found() -> Result<()> {
        block_on(async {
            let (store, _dir) = setup_test_db().await?;
            let phone = wppq_core::PhoneId::new("p-1");
            assert!(store.get_phone(&phone).await?.is_none());
            assert!(store.find_active_entries(&phone).await?.is_empty());
            assert!(store.get_attendance(&phone).await?.is_none());
            Ok(())
        })
    }
}
