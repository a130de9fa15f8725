//! Queue ordering engine
//!
//! Stateless between calls: every operation reads what it needs from the
//! injected [`QueueStore`], checks preconditions before the first write,
//! then persists. Reorders go through `apply_position_changes`, which is
//! atomic on stores that support it; a `Conflict` from a concurrent writer
//! is retried on a fresh read.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    identity::AccountId,
    phone::{Phone, PhoneId},
    queue::{
        next_position, plan_move, plan_renumber, sort_active, Direction, EntryId, NewEntry,
        PositionChange, QueueEntry,
    },
    store::QueueStore,
    Error, Result,
};

/// Result of an operation that may legitimately do nothing.
///
/// `NoOp` is a success: callers can skip refreshing their view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Applied(T),
    NoOp,
}

impl<T> Outcome<T> {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// The applied value, if any
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::NoOp => None,
        }
    }
}

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Extra attempts after a write conflict
    pub max_reorder_retries: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_reorder_retries: 3,
        }
    }
}

/// Maintains the ordered waiting queue of each phone
pub struct QueueEngine<S: QueueStore + ?Sized> {
    store: Arc<S>,
    options: EngineOptions,
}

impl<S: QueueStore + ?Sized> Clone for QueueEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options,
        }
    }
}

impl<S: QueueStore + ?Sized> QueueEngine<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, EngineOptions::default())
    }

    #[must_use]
    pub const fn with_options(store: Arc<S>, options: EngineOptions) -> Self {
        Self { store, options }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Put the phone in its own queue when it comes online.
    ///
    /// `NoOp` when the phone already has an active entry.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the phone does not exist
    /// - `Unauthorized` if `account` does not own it
    /// - `PreconditionFailed` if it is offline
    pub async fn enqueue(
        &self,
        phone_id: &PhoneId,
        account: &AccountId,
    ) -> Result<Outcome<QueueEntry>> {
        self.online_phone(phone_id, account).await?;

        let entries = self.store.find_active_entries(phone_id).await?;
        if !entries.is_empty() {
            debug!(phone = %phone_id, "Phone already queued");
            return Ok(Outcome::NoOp);
        }

        self.create(phone_id, account, next_position(&entries))
            .await
            .map(Outcome::Applied)
    }

    /// Append a waiting caller to the phone's queue, regardless of what
    /// is already waiting.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`Self::enqueue`]
    pub async fn push(&self, phone_id: &PhoneId, account: &AccountId) -> Result<QueueEntry> {
        self.online_phone(phone_id, account).await?;
        let entries = self.store.find_active_entries(phone_id).await?;
        self.create(phone_id, account, next_position(&entries)).await
    }

    async fn create(
        &self,
        phone_id: &PhoneId,
        account: &AccountId,
        position: u32,
    ) -> Result<QueueEntry> {
        let entry = self
            .store
            .create_entry(NewEntry {
                phone_id: phone_id.clone(),
                account_id: account.clone(),
                position,
            })
            .await?;
        info!(phone = %phone_id, entry = %entry.id, position, "Enqueued");
        Ok(entry)
    }

    /// Take the phone out of the queue when it goes offline or is removed.
    ///
    /// Ownership is checked by the caller. Other phones' queues are
    /// untouched. `NoOp` when nothing is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails; entries deactivated before the
    /// failure stay deactivated.
    pub async fn deactivate(&self, phone_id: &PhoneId) -> Result<Outcome<Vec<QueueEntry>>> {
        let entries = self.store.find_active_entries(phone_id).await?;
        if entries.is_empty() {
            return Ok(Outcome::NoOp);
        }

        let mut deactivated = Vec::with_capacity(entries.len());
        for mut entry in sort_active(&entries) {
            self.store.update_entry_active(&entry.id, false).await?;
            entry.active = false;
            deactivated.push(entry);
        }
        info!(phone = %phone_id, count = deactivated.len(), "Deactivated queue entries");
        Ok(Outcome::Applied(deactivated))
    }

    /// Move an entry within its phone's queue.
    ///
    /// Returns the full reordered queue, or `NoOp` when the entry already
    /// sits at the requested boundary.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the phone or entry does not exist
    /// - `Unauthorized` if `account` owns neither
    /// - `PreconditionFailed` if the phone is offline
    /// - `Conflict` if concurrent writes kept invalidating the plan
    pub async fn reorder(
        &self,
        entry_id: &EntryId,
        phone_id: &PhoneId,
        direction: Direction,
        account: &AccountId,
    ) -> Result<Outcome<Vec<QueueEntry>>> {
        let phone = self.online_phone(phone_id, account).await?;
        self.owned_entry(&phone, entry_id, account).await?;

        let applied = self
            .apply_with_retry(phone_id, |entries| plan_move(entries, entry_id, direction))
            .await?;
        if applied {
            info!(phone = %phone_id, entry = %entry_id, %direction, "Reordered");
            self.store
                .find_active_entries(phone_id)
                .await
                .map(|entries| Outcome::Applied(sort_active(&entries)))
        } else {
            debug!(phone = %phone_id, entry = %entry_id, %direction, "Reorder is a no-op");
            Ok(Outcome::NoOp)
        }
    }

    /// Remove one attended entry and close the gap behind it.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`Self::reorder`]. If closing the gap fails
    /// the entry stays deactivated and [`Self::repair`] restores the order.
    pub async fn attend(
        &self,
        entry_id: &EntryId,
        phone_id: &PhoneId,
        account: &AccountId,
    ) -> Result<QueueEntry> {
        let phone = self.online_phone(phone_id, account).await?;
        let mut entry = self.owned_entry(&phone, entry_id, account).await?;

        self.store.update_entry_active(entry_id, false).await?;
        entry.active = false;

        self.apply_with_retry(phone_id, |entries| Ok(non_empty(plan_renumber(entries))))
            .await?;
        info!(phone = %phone_id, entry = %entry_id, "Attended");
        Ok(entry)
    }

    /// Renumber the phone's active entries to `1..=N`.
    ///
    /// Recovery path after a partially applied write. `NoOp` when the queue
    /// is already contiguous.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Unauthorized` as for [`Self::list`]
    pub async fn repair(
        &self,
        phone_id: &PhoneId,
        account: &AccountId,
    ) -> Result<Outcome<Vec<QueueEntry>>> {
        self.owned_phone(phone_id, account).await?;

        let applied = self
            .apply_with_retry(phone_id, |entries| Ok(non_empty(plan_renumber(entries))))
            .await?;
        if applied {
            warn!(phone = %phone_id, "Repaired non-contiguous queue");
            self.list(phone_id, account).await.map(Outcome::Applied)
        } else {
            Ok(Outcome::NoOp)
        }
    }

    /// Active entries of a phone in queue order.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the phone does not exist
    /// - `Unauthorized` if `account` does not own it
    pub async fn list(&self, phone_id: &PhoneId, account: &AccountId) -> Result<Vec<QueueEntry>> {
        self.owned_phone(phone_id, account).await?;
        let entries = self.store.find_active_entries(phone_id).await?;
        Ok(sort_active(&entries))
    }

    /// Read, plan, write; re-plan on a fresh read after a conflict.
    ///
    /// Returns `false` when the plan was empty.
    async fn apply_with_retry<F>(&self, phone_id: &PhoneId, plan: F) -> Result<bool>
    where
        F: Fn(&[QueueEntry]) -> Result<Option<Vec<PositionChange>>> + Send + Sync,
    {
        let mut attempt = 0u32;
        loop {
            let entries = self.store.find_active_entries(phone_id).await?;
            let Some(changes) = plan(&entries)? else {
                return Ok(false);
            };
            debug!(phone = %phone_id, changes = changes.len(), attempt, "Applying position changes");

            match self.store.apply_position_changes(phone_id, &changes).await {
                Ok(()) => return Ok(true),
                Err(Error::Conflict(reason)) if attempt < self.options.max_reorder_retries => {
                    attempt += 1;
                    warn!(phone = %phone_id, attempt, %reason, "Queue changed concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn owned_phone(&self, phone_id: &PhoneId, account: &AccountId) -> Result<Phone> {
        let phone = self
            .store
            .get_phone(phone_id)
            .await?
            .filter(|p| !p.deleted)
            .ok_or_else(|| Error::not_found(format!("Phone {phone_id} not found")))?;
        if !phone.is_owned_by(account) {
            return Err(Error::unauthorized(format!(
                "Account {account} does not own phone {phone_id}"
            )));
        }
        Ok(phone)
    }

    async fn online_phone(&self, phone_id: &PhoneId, account: &AccountId) -> Result<Phone> {
        let phone = self.owned_phone(phone_id, account).await?;
        if !phone.online {
            return Err(Error::precondition_failed(format!(
                "Phone {phone_id} is not online"
            )));
        }
        Ok(phone)
    }

    async fn owned_entry(
        &self,
        phone: &Phone,
        entry_id: &EntryId,
        account: &AccountId,
    ) -> Result<QueueEntry> {
        let entry = self
            .store
            .get_entry(&phone.id, entry_id)
            .await?
            .filter(|e| e.active)
            .ok_or_else(|| Error::not_found(format!("Queue entry {entry_id} not found")))?;
        if &entry.account_id != account {
            return Err(Error::unauthorized(format!(
                "Account {account} does not own queue entry {entry_id}"
            )));
        }
        Ok(entry)
    }
}

fn non_empty(changes: Vec<PositionChange>) -> Option<Vec<PositionChange>> {
    (!changes.is_empty()).then_some(changes)
}
