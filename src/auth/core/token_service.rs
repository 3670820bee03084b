//! Session token issuing and verification

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

use crate::auth::config::MIN_SECRET_LENGTH;

/// Token errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token malformed")]
    Malformed,

    #[error("signing secret must be at least {MIN_SECRET_LENGTH} characters")]
    WeakSecret,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// JWT Claims
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User ID
    sub: String,
    /// Expiration (unix seconds)
    exp: i64,
    /// Issued at (unix seconds)
    iat: i64,
}

/// Issues and verifies HS256 session tokens
pub struct TokenService {
    secret: Zeroizing<String>,

    /// Token lifetime (seconds)
    expiry: i64,
}

impl TokenService {
    pub fn new(secret: String, expiry: u64) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret);
        }

        Ok(Self {
            secret: Zeroizing::new(secret),
            expiry: i64::try_from(expiry).unwrap_or(i64::MAX),
        })
    }

    pub fn expiry_secs(&self) -> i64 {
        self.expiry
    }

    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, user_id: &str, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now.saturating_add(self.expiry),
            iat: now,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))?;

        debug!("session token issued");
        Ok(token)
    }

    /// Verify a token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// Expiry is checked here instead of by `jsonwebtoken` so the boundary is
    /// exact: a token is valid strictly before `iat + expiry`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| TokenError::Malformed)?;

        if now >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims.sub)
    }
}
