//! Storage collaborator traits
//!
//! The engine owns no state between calls; everything it knows comes from
//! these traits. Implementations: [`crate::MemoryStore`] here, and the
//! SQLite store in the `wppq` crate.

use chrono::{DateTime, SubsecRound, Utc};

use crate::{
    identity::AccountId,
    metrics::AttendanceMetrics,
    phone::{NewPhone, Phone, PhoneId},
    queue::{EntryId, NewEntry, PositionChange, QueueEntry},
    Result,
};

/// Current time truncated to milliseconds, the precision stores persist.
///
/// Values handed back to callers must match what a later read returns.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Persistence boundary for the queue ordering engine.
#[async_trait::async_trait]
pub trait QueueStore: Send + Sync {
    /// Look up a phone, including soft-deleted ones.
    async fn get_phone(&self, phone_id: &PhoneId) -> Result<Option<Phone>>;

    /// All active entries of a phone, in no particular order.
    async fn find_active_entries(&self, phone_id: &PhoneId) -> Result<Vec<QueueEntry>>;

    /// Look up one entry of a phone, active or not.
    async fn get_entry(&self, phone_id: &PhoneId, entry_id: &EntryId)
        -> Result<Option<QueueEntry>>;

    /// Insert an active entry. The store assigns `id` and `created_at`.
    async fn create_entry(&self, entry: NewEntry) -> Result<QueueEntry>;

    async fn update_entry_position(&self, entry_id: &EntryId, position: u32) -> Result<()>;

    async fn update_entry_active(&self, entry_id: &EntryId, active: bool) -> Result<()>;

    /// Persist a batch of position changes for one phone.
    ///
    /// The provided implementation writes the changes one at a time and
    /// stops at the first failure, leaving earlier writes in place. Stores
    /// with transactions override it so the batch is all-or-nothing and a
    /// change whose entry no longer sits at `from` fails with
    /// `Error::Conflict`.
    async fn apply_position_changes(
        &self,
        phone_id: &PhoneId,
        changes: &[PositionChange],
    ) -> Result<()> {
        let _ = phone_id;
        for change in changes {
            self.update_entry_position(&change.entry_id, change.to)
                .await?;
        }
        Ok(())
    }
}

/// Phone registry persistence.
#[async_trait::async_trait]
pub trait PhoneStore: QueueStore {
    async fn create_phone(&self, phone: NewPhone) -> Result<Phone>;

    /// Non-deleted phone with this number, if any.
    async fn find_phone_by_number(&self, number: &str) -> Result<Option<Phone>>;

    /// Non-deleted phones owned by the account.
    async fn list_phones(&self, account: &AccountId) -> Result<Vec<Phone>>;

    /// Overwrite the stored phone with the given one.
    async fn update_phone(&self, phone: &Phone) -> Result<()>;
}

/// Per-phone attendance metrics persistence.
#[async_trait::async_trait]
pub trait MetricsStore: Send + Sync {
    async fn get_attendance(&self, phone_id: &PhoneId) -> Result<Option<AttendanceMetrics>>;

    async fn put_attendance(&self, metrics: &AttendanceMetrics) -> Result<()>;
}
