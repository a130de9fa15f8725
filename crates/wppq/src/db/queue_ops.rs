//! Queue entry operations

use tracing::debug;
use wppq_core::{
    store, EntryId, Error, NewEntry, Phone, PhoneId, PositionChange, QueueEntry, QueueStore, Result,
};

use super::{
    query::{
        db_error, parse_entry_row, parse_phone_row, row_id, to_millis, ENTRY_COLUMNS,
        PHONE_COLUMNS,
    },
    SqliteStore,
};

#[async_trait::async_trait]
impl QueueStore for SqliteStore {
    async fn get_phone(&self, phone_id: &PhoneId) -> Result<Option<Phone>> {
        let Some(id) = row_id(phone_id.as_str()) else {
            return Ok(None);
        };
        sqlx::query(&format!("SELECT {PHONE_COLUMNS} FROM phones WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("query phone", &e))
            .and_then(|row| row.as_ref().map(parse_phone_row).transpose())
    }

    async fn find_active_entries(&self, phone_id: &PhoneId) -> Result<Vec<QueueEntry>> {
        let Some(id) = row_id(phone_id.as_str()) else {
            return Ok(Vec::new());
        };
        sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries WHERE phone_id = ? AND active = 1"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("query queue entries", &e))?
        .iter()
        .map(parse_entry_row)
        .collect()
    }

    async fn get_entry(
        &self,
        phone_id: &PhoneId,
        entry_id: &EntryId,
    ) -> Result<Option<QueueEntry>> {
        let (Some(phone), Some(entry)) = (row_id(phone_id.as_str()), row_id(entry_id.as_str()))
        else {
            return Ok(None);
        };
        sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries WHERE id = ? AND phone_id = ?"
        ))
        .bind(entry)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("query queue entry", &e))
        .and_then(|row| row.as_ref().map(parse_entry_row).transpose())
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<QueueEntry> {
        let phone = row_id(entry.phone_id.as_str())
            .ok_or_else(|| Error::not_found(format!("Phone {} not found", entry.phone_id)))?;
        let now = store::now();

        let id = sqlx::query(
            "INSERT INTO queue_entries (phone_id, account_id, position, active, created_at)
             VALUES (?, ?, ?, 1, ?)",
        )
        .bind(phone)
        .bind(entry.account_id.as_str())
        .bind(i64::from(entry.position))
        .bind(to_millis(now))
        .execute(&self.pool)
        .await
        .map(|result| result.last_insert_rowid())
        .map_err(|e| db_error("create queue entry", &e))?;

        Ok(QueueEntry {
            id: EntryId::new(id.to_string()),
            phone_id: entry.phone_id,
            account_id: entry.account_id,
            position: entry.position,
            active: true,
            created_at: now,
        })
    }

    async fn update_entry_position(&self, entry_id: &EntryId, position: u32) -> Result<()> {
        let id = entry_row_id(entry_id)?;
        sqlx::query("UPDATE queue_entries SET position = ? WHERE id = ?")
            .bind(i64::from(position))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update queue position", &e))
            .and_then(|result| expect_row(result.rows_affected(), entry_id))
    }

    async fn update_entry_active(&self, entry_id: &EntryId, active: bool) -> Result<()> {
        let id = entry_row_id(entry_id)?;
        sqlx::query("UPDATE queue_entries SET active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update queue entry", &e))
            .and_then(|result| expect_row(result.rows_affected(), entry_id))
    }

    /// All-or-nothing: every change is guarded by its expected `from`
    /// position inside one transaction.
    async fn apply_position_changes(
        &self,
        phone_id: &PhoneId,
        changes: &[PositionChange],
    ) -> Result<()> {
        let phone = row_id(phone_id.as_str())
            .ok_or_else(|| Error::not_found(format!("Phone {phone_id} not found")))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", &e))?;

        for change in changes {
            let entry = entry_row_id(&change.entry_id)?;
            let affected = sqlx::query(
                "UPDATE queue_entries SET position = ?
                 WHERE id = ? AND phone_id = ? AND active = 1 AND position = ?",
            )
            .bind(i64::from(change.to))
            .bind(entry)
            .bind(phone)
            .bind(i64::from(change.from))
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("update queue position", &e))?
            .rows_affected();

            if affected == 0 {
                tx.rollback()
                    .await
                    .map_err(|e| db_error("roll back transaction", &e))?;
                debug!(entry = %change.entry_id, from = change.from, "Stale position, rolled back");
                return Err(Error::conflict(format!(
                    "Entry {} is no longer at position {}",
                    change.entry_id, change.from
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit transaction", &e))
    }
}

fn entry_row_id(entry_id: &EntryId) -> Result<i64> {
    row_id(entry_id.as_str())
        .ok_or_else(|| Error::not_found(format!("Queue entry {entry_id} not found")))
}

fn expect_row(affected: u64, entry_id: &EntryId) -> Result<()> {
    if affected == 0 {
        Err(Error::not_found(format!("Queue entry {entry_id} not found")))
    } else {
        Ok(())
    }
}
