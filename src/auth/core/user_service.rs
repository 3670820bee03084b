//! Account flows: registration, sessions, email verification

use std::sync::Arc;

use chrono::Utc;
use md5::{Digest, Md5};
use tracing::info;
use uuid::Uuid;

use super::{PasswordService, TokenService};
use crate::{
    auth::{
        storage::UserStorage,
        types::{LoginRequest, RegisterRequest, Subscription, User},
    },
    errors::{ApiError, AuthFailure},
    mail::{verification_letter, Mailer},
};

/// Account service
pub struct UserService {
    storage: Arc<dyn UserStorage>,
    tokens: Arc<TokenService>,
    passwords: PasswordService,
    mailer: Arc<dyn Mailer>,
    /// Base of verification links
    base_url: String,
}

impl UserService {
    pub fn new(
        storage: Arc<dyn UserStorage>,
        tokens: Arc<TokenService>,
        passwords: PasswordService,
        mailer: Arc<dyn Mailer>,
        base_url: String,
    ) -> Self {
        Self {
            storage,
            tokens,
            passwords,
            mailer,
            base_url,
        }
    }

    /// Create an unverified account and send the verification email
    pub async fn register(&self, req: RegisterRequest) -> Result<User, ApiError> {
        let email = normalize_email(&req.email);
        self.passwords.validate_strength(&req.password)?;

        if self.storage.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict("Email in use".to_string()));
        }

        let password_hash = self.passwords.hash_password(&req.password)?;
        let verify_token = Uuid::new_v4().simple().to_string();

        let user = User {
            id: Uuid::new_v4().to_string(),
            avatar_url: Some(gravatar_url(&email)),
            email,
            password_hash,
            subscription: req.subscription.unwrap_or_default(),
            token: None,
            verified_email: false,
            verify_token: Some(verify_token.clone()),
            created_at: Utc::now(),
        };

        // the unique index still guards against a concurrent registration
        self.storage.insert_user(&user).await?;
        info!(user_id = %user.id, "user registered");

        self.mailer
            .send(verification_letter(&user.email, &self.base_url, &verify_token))
            .await?;

        Ok(user)
    }

    /// Check credentials and start a new session, replacing any previous one
    pub async fn login(&self, req: LoginRequest) -> Result<(String, User), ApiError> {
        let email = normalize_email(&req.email);
        let Some(mut user) = self.storage.find_by_email(&email).await? else {
            self.passwords.verify_dummy(&req.password);
            return Err(ApiError::InvalidCredentials);
        };

        if !self
            .passwords
            .verify_password(&req.password, &user.password_hash)?
        {
            return Err(ApiError::InvalidCredentials);
        }

        if !user.verified_email {
            return Err(ApiError::EmailNotVerified);
        }

        let token = self.tokens.issue(&user.id)?;
        self.storage
            .set_session_token(&user.id, Some(&token))
            .await?;
        user.token = Some(token.clone());

        info!(user_id = %user.id, "user logged in");
        Ok((token, user))
    }

    pub async fn logout(&self, user: &User) -> Result<(), ApiError> {
        self.storage.set_session_token(&user.id, None).await?;
        info!(user_id = %user.id, "user logged out");
        Ok(())
    }

    /// Resolve a bearer token to its user.
    ///
    /// The token must verify and also be the user's current session token,
    /// so logging out or logging in elsewhere revokes it.
    pub async fn authenticate(&self, token: &str) -> Result<User, ApiError> {
        let user_id = self.tokens.verify(token)?;

        let user = self
            .storage
            .find_by_id(&user_id)
            .await?
            .ok_or(ApiError::Unauthenticated(AuthFailure::SessionRevoked))?;

        if user.token.as_deref() != Some(token) {
            return Err(ApiError::Unauthenticated(AuthFailure::SessionRevoked));
        }

        Ok(user)
    }

    pub async fn update_subscription(
        &self,
        user: &User,
        subscription: Subscription,
    ) -> Result<User, ApiError> {
        let updated = self
            .storage
            .set_subscription(&user.id, subscription)
            .await?;
        info!(user_id = %user.id, %subscription, "subscription changed");
        Ok(updated)
    }

    pub async fn update_avatar(&self, user: &User, avatar_url: &str) -> Result<(), ApiError> {
        self.storage.set_avatar(&user.id, avatar_url).await
    }

    /// Consume a verification token
    pub async fn verify_email(&self, verify_token: &str) -> Result<User, ApiError> {
        let user = self
            .storage
            .consume_verify_token(verify_token)
            .await?
            .ok_or(ApiError::NotFound)?;

        info!(user_id = %user.id, "email verified");
        Ok(user)
    }

    /// Send the verification email again. The existing token is reused.
    pub async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        let user = self
            .storage
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(ApiError::NotFound)?;

        if user.verified_email {
            return Err(ApiError::AlreadyVerified);
        }

        let verify_token = user
            .verify_token
            .as_deref()
            .ok_or_else(|| ApiError::Internal(format!("user {} has no verify token", user.id)))?;

        self.mailer
            .send(verification_letter(&user.email, &self.base_url, verify_token))
            .await
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Default avatar for an email address
pub fn gravatar_url(email: &str) -> String {
    let digest = Md5::digest(normalize_email(email).as_bytes());
    format!("https://www.gravatar.com/avatar/{}?d=identicon", hex::encode(digest))
}
