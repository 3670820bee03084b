//! Ownership scoping for contact queries
//!
//! Every [`ContactStorage`](super::storage::ContactStorage) method takes one of
//! these scopes, so a query that is not filtered by owner cannot be written.
//! A scope is normally built from the authenticated user.

use crate::auth::types::User;

use super::types::Contact;

/// All contacts of one owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerScope {
    owner: String,
}

impl OwnerScope {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self::new(user.id.clone())
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Narrow to a single contact: `owner == self.owner AND id == contact_id`
    pub fn contact(&self, contact_id: impl Into<String>) -> ContactScope {
        ContactScope {
            owner: self.owner.clone(),
            id: contact_id.into(),
        }
    }

    pub fn admits(&self, contact: &Contact) -> bool {
        contact.owner == self.owner
    }
}

/// One contact of one owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactScope {
    owner: String,
    id: String,
}

impl ContactScope {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn admits(&self, contact: &Contact) -> bool {
        contact.owner == self.owner && contact.id == self.id
    }
}
