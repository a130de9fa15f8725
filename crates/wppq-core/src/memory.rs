//! In-memory store
//!
//! Implements every store trait over maps guarded by a single lock, so each
//! call (including a position batch) is atomic. Used by tests and by
//! callers that do not need persistence.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use crate::{
    identity::AccountId,
    metrics::AttendanceMetrics,
    phone::{NewPhone, Phone, PhoneId},
    queue::{EntryId, NewEntry, PositionChange, QueueEntry},
    store::{self, MetricsStore, PhoneStore, QueueStore},
    Error, Result,
};

#[derive(Debug, Default)]
struct State {
    phones: BTreeMap<PhoneId, Phone>,
    entries: BTreeMap<EntryId, QueueEntry>,
    attendance: HashMap<PhoneId, AttendanceMetrics>,
    next_id: u64,
    pending_conflicts: u32,
    unavailable: bool,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(Error::collaborator("In-memory store marked unavailable"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a phone as-is.
    pub async fn insert_phone(&self, phone: Phone) {
        self.state.write().await.phones.insert(phone.id.clone(), phone);
    }

    /// Insert or replace an entry as-is, bypassing every rule.
    pub async fn insert_entry(&self, entry: QueueEntry) {
        self.state.write().await.entries.insert(entry.id.clone(), entry);
    }

    /// Every entry of a phone, active or not.
    pub async fn all_entries(&self, phone_id: &PhoneId) -> Vec<QueueEntry> {
        self.state
            .read()
            .await
            .entries
            .values()
            .filter(|e| &e.phone_id == phone_id)
            .cloned()
            .collect()
    }

    /// Make the next `count` position batches fail with `Error::Conflict`.
    pub async fn inject_conflicts(&self, count: u32) {
        self.state.write().await.pending_conflicts = count;
    }

    /// Make every call fail with `Error::Collaborator` while set.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }
}

#[async_trait::async_trait]
impl QueueStore for MemoryStore {
    async fn get_phone(&self, phone_id: &PhoneId) -> Result<Option<Phone>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.phones.get(phone_id).cloned())
    }

    async fn find_active_entries(&self, phone_id: &PhoneId) -> Result<Vec<QueueEntry>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state
            .entries
            .values()
            .filter(|e| e.active && &e.phone_id == phone_id)
            .cloned()
            .collect())
    }

    async fn get_entry(
        &self,
        phone_id: &PhoneId,
        entry_id: &EntryId,
    ) -> Result<Option<QueueEntry>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state
            .entries
            .get(entry_id)
            .filter(|e| &e.phone_id == phone_id)
            .cloned())
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<QueueEntry> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let created = QueueEntry {
            id: EntryId::new(state.next_id("e")),
            phone_id: entry.phone_id,
            account_id: entry.account_id,
            position: entry.position,
            active: true,
            created_at: store::now(),
        };
        state.entries.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_entry_position(&self, entry_id: &EntryId, position: u32) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        state
            .entries
            .get_mut(entry_id)
            .map(|e| e.position = position)
            .ok_or_else(|| Error::not_found(format!("Queue entry {entry_id} not found")))
    }

    async fn update_entry_active(&self, entry_id: &EntryId, active: bool) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        state
            .entries
            .get_mut(entry_id)
            .map(|e| e.active = active)
            .ok_or_else(|| Error::not_found(format!("Queue entry {entry_id} not found")))
    }

    async fn apply_position_changes(
        &self,
        phone_id: &PhoneId,
        changes: &[PositionChange],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;

        if state.pending_conflicts > 0 {
            state.pending_conflicts -= 1;
            return Err(Error::conflict("Injected conflict"));
        }

        let stale = changes.iter().find(|change| {
            !state.entries.get(&change.entry_id).is_some_and(|e| {
                e.active && &e.phone_id == phone_id && e.position == change.from
            })
        });
        if let Some(change) = stale {
            return Err(Error::conflict(format!(
                "Queue entry {} moved since it was read",
                change.entry_id
            )));
        }

        for change in changes {
            if let Some(entry) = state.entries.get_mut(&change.entry_id) {
                entry.position = change.to;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PhoneStore for MemoryStore {
    async fn create_phone(&self, phone: NewPhone) -> Result<Phone> {
        let mut state = self.state.write().await;
        state.check_available()?;
        let created = Phone {
            id: PhoneId::new(state.next_id("p")),
            account_id: phone.account_id,
            number: phone.number,
            name: phone.name,
            online: false,
            created_at: store::now(),
            last_online_change: None,
            last_online: None,
            last_offline: None,
            deleted: false,
        };
        state.phones.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn find_phone_by_number(&self, number: &str) -> Result<Option<Phone>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state
            .phones
            .values()
            .find(|p| !p.deleted && p.number == number)
            .cloned())
    }

    async fn list_phones(&self, account: &AccountId) -> Result<Vec<Phone>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state
            .phones
            .values()
            .filter(|p| !p.deleted && &p.account_id == account)
            .cloned()
            .collect())
    }

    async fn update_phone(&self, phone: &Phone) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        match state.phones.get_mut(&phone.id) {
            Some(stored) => {
                *stored = phone.clone();
                Ok(())
            }
            None => Err(Error::not_found(format!("Phone {} not found", phone.id))),
        }
    }
}

#[async_trait::async_trait]
impl MetricsStore for MemoryStore {
    async fn get_attendance(&self, phone_id: &PhoneId) -> Result<Option<AttendanceMetrics>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.attendance.get(phone_id).cloned())
    }

    async fn put_attendance(&self, metrics: &AttendanceMetrics) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_available()?;
        state
            .attendance
            .insert(metrics.phone_id.clone(), metrics.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(position: u32) -> NewEntry {
        NewEntry {
            phone_id: PhoneId::new("p-1"),
            account_id: AccountId::new("acct"),
            position,
        }
    }

    #[tokio::test]
    async fn test_stale_batch_is_rejected_whole() -> Result<()> {
        let store = MemoryStore::new();
        let a = store.create_entry(new_entry(1)).await?;
        let b = store.create_entry(new_entry(2)).await?;

        let changes = vec![
            PositionChange { entry_id: a.id.clone(), from: 1, to: 2 },
            PositionChange { entry_id: b.id.clone(), from: 5, to: 1 },
        ];
        let result = store.apply_position_changes(&a.phone_id, &changes).await;
        assert!(matches!(result, Err(Error::Conflict(_))));

        let a_now = store.get_entry(&a.phone_id, &a.id).await?;
        assert_eq!(a_now.map(|e| e.position), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() -> Result<()> {
        let store = MemoryStore::new();
        store.set_unavailable(true).await;
        let result = store.find_active_entries(&PhoneId::new("p-1")).await;
        assert!(matches!(result, Err(Error::Collaborator(_))));

        store.set_unavailable(false).await;
        assert!(store.find_active_entries(&PhoneId::new("p-1")).await?.is_empty());
        Ok(())
    }
}
