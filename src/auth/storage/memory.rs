//! In-memory user storage (development and tests)

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::r#trait::UserStorage;
use crate::{
    auth::types::{Subscription, User},
    errors::ApiError,
};

/// In-memory user storage
#[derive(Clone, Default)]
pub struct MemoryUserStorage {
    /// id -> User
    users: Arc<RwLock<HashMap<String, User>>>,

    /// email -> id
    email_index: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryUserStorage {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update<F>(&self, id: &str, apply: F) -> Result<User, ApiError>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(ApiError::NotFound)?;
        apply(user);
        Ok(user.clone())
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        // lock order: email_index, then users
        let mut email_index = self.email_index.write().await;
        if email_index.contains_key(&user.email) {
            return Err(ApiError::Conflict("Email in use".to_string()));
        }

        let mut users = self.users.write().await;
        email_index.insert(user.email.clone(), user.id.clone());
        users.insert(user.id.clone(), user.clone());

        info!(user_id = %user.id, "user stored in memory");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let id = {
            let email_index = self.email_index.read().await;
            match email_index.get(email) {
                Some(id) => id.clone(),
                None => return Ok(None),
            }
        };
        self.find_by_id(&id).await
    }

    async fn set_session_token(&self, id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let token = token.map(str::to_string);
        self.update(id, |user| user.token = token).await?;
        Ok(())
    }

    async fn set_subscription(
        &self,
        id: &str,
        subscription: Subscription,
    ) -> Result<User, ApiError> {
        self.update(id, |user| user.subscription = subscription).await
    }

    async fn set_avatar(&self, id: &str, avatar_url: &str) -> Result<(), ApiError> {
        let avatar_url = avatar_url.to_string();
        self.update(id, |user| user.avatar_url = Some(avatar_url))
            .await?;
        Ok(())
    }

    async fn consume_verify_token(&self, verify_token: &str) -> Result<Option<User>, ApiError> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|user| user.verify_token.as_deref() == Some(verify_token));

        Ok(user.map(|user| {
            user.verified_email = true;
            user.verify_token = None;
            user.clone()
        }))
    }
}
