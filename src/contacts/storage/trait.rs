//! Contact storage trait

use async_trait::async_trait;

use crate::{
    contacts::{
        scope::{ContactScope, OwnerScope},
        types::{Contact, ContactChanges, ContactFilter, NewContact},
    },
    errors::ApiError,
};

/// Persisted contacts, always addressed through an ownership scope
///
/// Single-contact operations return `Ok(None)` when the contact does not
/// exist or belongs to someone else; callers cannot tell the two apart.
#[async_trait]
pub trait ContactStorage: Send + Sync {
    /// Contacts of the scope's owner, oldest first
    async fn list(&self, scope: &OwnerScope, filter: ContactFilter)
        -> Result<Vec<Contact>, ApiError>;

    /// Store a new contact owned by the scope's owner
    async fn insert(&self, scope: &OwnerScope, contact: NewContact) -> Result<Contact, ApiError>;

    async fn get(&self, scope: &ContactScope) -> Result<Option<Contact>, ApiError>;

    async fn update(
        &self,
        scope: &ContactScope,
        changes: ContactChanges,
    ) -> Result<Option<Contact>, ApiError>;

    /// Delete and return the removed contact
    async fn delete(&self, scope: &ContactScope) -> Result<Option<Contact>, ApiError>;
}
