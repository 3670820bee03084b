//! Authentication settings

use crate::config::{require, try_load, ConfigError};

/// Minimum accepted length of the JWT signing secret
pub const MIN_SECRET_LENGTH: usize = 32;

/// Authentication settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,

    /// Session token lifetime (seconds)
    pub token_expiry: u64,

    pub password: PasswordConfig,
}

/// Password policy and hashing cost
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub min_length: usize,

    /// bcrypt cost
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = require("JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
            });
        }

        Ok(Self {
            jwt_secret,
            token_expiry: try_load("TOKEN_EXPIRY", 3600u64),
            password: PasswordConfig {
                min_length: try_load("PASSWORD_MIN_LENGTH", 6usize),
                bcrypt_cost: try_load("BCRYPT_COST", bcrypt::DEFAULT_COST),
            },
        })
    }
}
