//! Contact operations on behalf of an authenticated owner

use std::sync::Arc;

use tracing::{debug, info};

use super::{
    scope::OwnerScope,
    storage::ContactStorage,
    types::{Contact, ContactChanges, ContactFilter, NewContact},
};
use crate::errors::ApiError;

/// Contact service
pub struct ContactService {
    storage: Arc<dyn ContactStorage>,
}

impl ContactService {
    pub fn new(storage: Arc<dyn ContactStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(
        &self,
        scope: &OwnerScope,
        filter: ContactFilter,
    ) -> Result<Vec<Contact>, ApiError> {
        debug!(owner = scope.owner(), ?filter, "listing contacts");
        self.storage.list(scope, filter).await
    }

    pub async fn create(&self, scope: &OwnerScope, contact: NewContact) -> Result<Contact, ApiError> {
        let contact = self.storage.insert(scope, contact).await?;
        info!(owner = scope.owner(), contact_id = %contact.id, "contact created");
        Ok(contact)
    }

    pub async fn get(&self, scope: &OwnerScope, contact_id: &str) -> Result<Contact, ApiError> {
        self.storage
            .get(&scope.contact(contact_id))
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Apply a partial update. At least one field must be present.
    pub async fn update(
        &self,
        scope: &OwnerScope,
        contact_id: &str,
        changes: ContactChanges,
    ) -> Result<Contact, ApiError> {
        if changes.is_empty() {
            return Err(ApiError::Validation("missing fields".to_string()));
        }

        self.storage
            .update(&scope.contact(contact_id), changes)
            .await?
            .ok_or(ApiError::NotFound)
    }

    pub async fn set_favorite(
        &self,
        scope: &OwnerScope,
        contact_id: &str,
        favorite: bool,
    ) -> Result<Contact, ApiError> {
        self.storage
            .update(&scope.contact(contact_id), ContactChanges::favorite(favorite))
            .await?
            .ok_or(ApiError::NotFound)
    }

    pub async fn delete(&self, scope: &OwnerScope, contact_id: &str) -> Result<Contact, ApiError> {
        let removed = self
            .storage
            .delete(&scope.contact(contact_id))
            .await?
            .ok_or(ApiError::NotFound)?;

        info!(owner = scope.owner(), contact_id, "contact deleted");
        Ok(removed)
    }
}
