//! Password hashing service

use std::sync::OnceLock;

use tracing::debug;

use crate::{auth::config::PasswordConfig, errors::ApiError};

/// Password hashing and policy checks (bcrypt)
pub struct PasswordService {
    config: PasswordConfig,
    /// Hash at the configured cost, verified against for unknown accounts
    dummy_hash: OnceLock<String>,
}

impl PasswordService {
    pub fn new(config: PasswordConfig) -> Self {
        Self {
            config,
            dummy_hash: OnceLock::new(),
        }
    }

    pub fn validate_strength(&self, password: &str) -> Result<(), ApiError> {
        if password.chars().count() < self.config.min_length {
            return Err(ApiError::Validation(format!(
                "password must be at least {} characters",
                self.config.min_length
            )));
        }

        Ok(())
    }

    /// Salted one-way hash
    pub fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        let hash = bcrypt::hash(password, self.config.bcrypt_cost)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;
        debug!("password hashed");
        Ok(hash)
    }

    /// Constant-time comparison against a stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        bcrypt::verify(password, hash)
            .map_err(|e| ApiError::Internal(format!("password verification failed: {e}")))
    }

    /// Spend the same bcrypt work as [`verify_password`](Self::verify_password)
    /// when there is no stored hash to check. Always `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let hash = self.dummy_hash.get_or_init(|| {
            bcrypt::hash("not-a-real-password", self.config.bcrypt_cost).unwrap_or_default()
        });
        let _ = bcrypt::verify(password, hash);
        false
    }

    #[cfg(test)]
    pub(crate) fn has_dummy_hash(&self) -> bool {
        self.dummy_hash.get().is_some_and(|hash| !hash.is_empty())
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(PasswordConfig::default())
    }
}
