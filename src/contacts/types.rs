//! Contact types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stored contact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub favorite: bool,
    /// Owning user id, fixed at creation
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// Create request. An `owner` in the body is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewContact {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[serde(default)]
    pub favorite: bool,
}

/// Partial update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContactChanges {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: Option<String>,
    pub favorite: Option<bool>,
}

impl ContactChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.favorite.is_none()
    }

    pub fn favorite(favorite: bool) -> Self {
        Self {
            favorite: Some(favorite),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, contact: &mut Contact) {
        if let Some(name) = self.name {
            contact.name = name;
        }
        if let Some(email) = self.email {
            contact.email = email;
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
        if let Some(favorite) = self.favorite {
            contact.favorite = favorite;
        }
    }
}

/// Favorite toggle request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FavoriteRequest {
    pub favorite: bool,
}

/// Query string of the list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub favorite: Option<bool>,
}

/// Normalised list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFilter {
    pub favorite: Option<bool>,
    pub offset: u32,
    pub limit: u32,
}

impl ContactFilter {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn from_query(query: &ListQuery) -> Self {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);

        Self {
            favorite: query.favorite,
            offset: (page - 1).saturating_mul(limit),
            limit,
        }
    }
}

impl Default for ContactFilter {
    fn default() -> Self {
        Self::from_query(&ListQuery::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_and_bounds() {
        assert_eq!(
            ContactFilter::default(),
            ContactFilter {
                favorite: None,
                offset: 0,
                limit: 20
            }
        );

        let filter = ContactFilter::from_query(&ListQuery {
            page: Some(3),
            limit: Some(500),
            favorite: Some(true),
        });
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.offset, 200);
        assert_eq!(filter.favorite, Some(true));

        let filter = ContactFilter::from_query(&ListQuery {
            page: Some(0),
            limit: Some(0),
            favorite: None,
        });
        assert_eq!((filter.offset, filter.limit), (0, 1));
    }

    #[test]
    fn test_changes_apply_only_present_fields() {
        let mut contact = Contact {
            id: "c1".to_string(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            phone: "111".to_string(),
            favorite: false,
            owner: "u1".to_string(),
            created_at: Utc::now(),
        };

        ContactChanges {
            phone: Some("222".to_string()),
            ..ContactChanges::default()
        }
        .apply(&mut contact);

        assert_eq!(contact.name, "Ann");
        assert_eq!(contact.phone, "222");
        assert!(ContactChanges::default().is_empty());
        assert!(!ContactChanges::favorite(true).is_empty());
    }

    #[test]
    fn test_new_contact_ignores_owner_field() {
        let contact: NewContact = serde_json::from_value(serde_json::json!({
            "name": "Ann",
            "email": "ann@x.com",
            "phone": "111",
            "owner": "someone-else"
        }))
        .unwrap();

        assert!(!contact.favorite);
        assert!(contact.validate().is_ok());
    }
}
