//! User storage trait

use async_trait::async_trait;

use crate::{
    auth::types::{Subscription, User},
    errors::ApiError,
};

/// Persisted user records
///
/// Every method is a single atomic read or write. Lookups return `Ok(None)` on
/// a miss; updates addressed to an unknown id fail with [`ApiError::NotFound`].
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a new user. Fails with [`ApiError::Conflict`] if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<(), ApiError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Replace (or clear) the user's live session token
    async fn set_session_token(&self, id: &str, token: Option<&str>) -> Result<(), ApiError>;

    async fn set_subscription(
        &self,
        id: &str,
        subscription: Subscription,
    ) -> Result<User, ApiError>;

    async fn set_avatar(&self, id: &str, avatar_url: &str) -> Result<(), ApiError>;

    /// Mark the owner of `verify_token` as verified and clear the token.
    ///
    /// Returns `None` when no user holds that token, including when it was
    /// already consumed.
    async fn consume_verify_token(&self, verify_token: &str) -> Result<Option<User>, ApiError>;
}
