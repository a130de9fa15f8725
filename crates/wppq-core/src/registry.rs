//! Phone registry
//!
//! CRUD for phone lines plus the online/offline transitions that drive the
//! queue engine.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::{
    engine::{EngineOptions, Outcome, QueueEngine},
    identity::AccountId,
    phone::{normalize_number, NewPhone, Phone, PhoneId},
    queue::QueueEntry,
    store::{self, PhoneStore},
    Error, Result,
};

/// What an online/offline transition did to the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnlineChange {
    pub phone: Phone,
    /// Entry created by going online, `None` if already queued
    pub enqueued: Option<QueueEntry>,
    /// Entries deactivated by going offline
    pub deactivated: Vec<QueueEntry>,
}

pub struct PhoneRegistry<S: PhoneStore + ?Sized> {
    store: Arc<S>,
    engine: QueueEngine<S>,
}

impl<S: PhoneStore + ?Sized> PhoneRegistry<S> {
    #[must_use]
    pub fn new(store: Arc<S>, options: EngineOptions) -> Self {
        let engine = QueueEngine::with_options(Arc::clone(&store), options);
        Self { store, engine }
    }

    #[must_use]
    pub const fn engine(&self) -> &QueueEngine<S> {
        &self.engine
    }

    /// Register a new phone, initially offline.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the number is blank or already
    /// registered
    pub async fn register(&self, number: &str, name: &str, account: &AccountId) -> Result<Phone> {
        let number = normalize_number(number)?;
        self.ensure_number_free(&number, None).await?;

        let phone = self
            .store
            .create_phone(NewPhone {
                account_id: account.clone(),
                number,
                name: name.trim().to_string(),
            })
            .await?;
        info!(phone = %phone.id, "Registered phone");
        Ok(phone)
    }

    /// Phones owned by the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn list(&self, account: &AccountId) -> Result<Vec<Phone>> {
        let mut phones = self.store.list_phones(account).await?;
        phones.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(phones)
    }

    /// Change a phone's display name and/or number.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Unauthorized` for a missing or foreign phone
    /// - `Validation` for a blank or duplicate number
    pub async fn edit(
        &self,
        phone_id: &PhoneId,
        name: Option<&str>,
        number: Option<&str>,
        account: &AccountId,
    ) -> Result<Phone> {
        let mut phone = self.owned(phone_id, account).await?;

        if let Some(number) = number {
            let number = normalize_number(number)?;
            self.ensure_number_free(&number, Some(phone_id)).await?;
            phone.number = number;
        }
        if let Some(name) = name {
            phone.name = name.trim().to_string();
        }

        self.store.update_phone(&phone).await?;
        info!(phone = %phone_id, "Updated phone");
        Ok(phone)
    }

    /// Flip a phone online or offline and update its queue accordingly.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Unauthorized` for a missing or foreign phone
    /// - any store failure; the phone update is not rolled back if the
    ///   queue update fails
    pub async fn set_online(
        &self,
        phone_id: &PhoneId,
        online: bool,
        account: &AccountId,
    ) -> Result<OnlineChange> {
        let phone = self
            .owned(phone_id, account)
            .await?
            .with_online(online, store::now());
        self.store.update_phone(&phone).await?;
        info!(phone = %phone_id, online, "Phone status changed");

        if online {
            let enqueued = self.engine.enqueue(phone_id, account).await?.applied();
            Ok(OnlineChange {
                phone,
                enqueued,
                deactivated: Vec::new(),
            })
        } else {
            let deactivated = self
                .engine
                .deactivate(phone_id)
                .await?
                .applied()
                .unwrap_or_default();
            Ok(OnlineChange {
                phone,
                enqueued: None,
                deactivated,
            })
        }
    }

    /// Soft-delete a phone and take it out of the queue.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Unauthorized` for a missing or foreign phone
    pub async fn remove(
        &self,
        phone_id: &PhoneId,
        account: &AccountId,
    ) -> Result<Outcome<Vec<QueueEntry>>> {
        let mut phone = self.owned(phone_id, account).await?;
        phone.deleted = true;
        phone.online = false;
        self.store.update_phone(&phone).await?;
        info!(phone = %phone_id, "Removed phone");

        self.engine.deactivate(phone_id).await
    }

    async fn owned(&self, phone_id: &PhoneId, account: &AccountId) -> Result<Phone> {
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

    async fn ensure_number_free(&self, number: &str, except: Option<&PhoneId>) -> Result<()> {
        match self.store.find_phone_by_number(number).await? {
            Some(existing) if Some(&existing.id) != except => {
                Err(Error::validation("Phone number already exists"))
            }
            _ => Ok(()),
        }
    }
}
