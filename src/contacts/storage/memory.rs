//! In-memory contact storage

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::r#trait::ContactStorage;
use crate::{
    contacts::{
        scope::{ContactScope, OwnerScope},
        types::{Contact, ContactChanges, ContactFilter, NewContact},
    },
    errors::ApiError,
};

/// In-memory contact storage, insertion ordered
#[derive(Clone, Default)]
pub struct MemoryContactStorage {
    contacts: Arc<RwLock<Vec<Contact>>>,
}

impl MemoryContactStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStorage for MemoryContactStorage {
    async fn list(
        &self,
        scope: &OwnerScope,
        filter: ContactFilter,
    ) -> Result<Vec<Contact>, ApiError> {
        let contacts = self.contacts.read().await;
        Ok(contacts
            .iter()
            .filter(|contact| scope.admits(contact))
            .filter(|contact| filter.favorite.map_or(true, |fav| contact.favorite == fav))
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn insert(&self, scope: &OwnerScope, contact: NewContact) -> Result<Contact, ApiError> {
        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            favorite: contact.favorite,
            owner: scope.owner().to_string(),
            created_at: Utc::now(),
        };

        self.contacts.write().await.push(contact.clone());
        Ok(contact)
    }

    async fn get(&self, scope: &ContactScope) -> Result<Option<Contact>, ApiError> {
        let contacts = self.contacts.read().await;
        Ok(contacts.iter().find(|contact| scope.admits(contact)).cloned())
    }

    async fn update(
        &self,
        scope: &ContactScope,
        changes: ContactChanges,
    ) -> Result<Option<Contact>, ApiError> {
        let mut contacts = self.contacts.write().await;
        Ok(contacts
            .iter_mut()
            .find(|contact| scope.admits(contact))
            .map(|contact| {
                changes.apply(contact);
                contact.clone()
            }))
    }

    async fn delete(&self, scope: &ContactScope) -> Result<Option<Contact>, ApiError> {
        let mut contacts = self.contacts.write().await;
        Ok(contacts
            .iter()
            .position(|contact| scope.admits(contact))
            .map(|index| contacts.remove(index)))
    }
}
