//! Process-wide configuration
//!
//! Loaded once at startup and handed to the collaborators that need it.

use std::{
    env,
    fmt::{Debug, Display},
    path::PathBuf,
    str::FromStr,
};

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::config::AuthConfig;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub avatars: AvatarConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `*` or a comma separated list of origins
    pub cors_allow_origin: String,
}

/// Storage backend settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// sqlite URL, or `memory` for the in-process store
    pub database_url: String,
    pub max_connections: u32,
}

/// Outgoing mail settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// No key means letters are only logged
    pub sendgrid_api_key: Option<String>,
    pub from: String,
    /// Public base URL used to build verification links
    pub base_url: String,
}

/// Avatar file locations
#[derive(Debug, Clone)]
pub struct AvatarConfig {
    /// Root served statically; avatars live in `{public_dir}/avatars`
    pub public_dir: PathBuf,
    /// Scratch directory for uploads in flight
    pub tmp_dir: PathBuf,
    /// Edge length of the normalised square avatar
    pub size: u32,
}

impl AvatarConfig {
    pub fn avatars_dir(&self) -> PathBuf {
        self.public_dir.join("avatars")
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = try_load("PORT", 3000u16);

        Ok(Self {
            server: ServerConfig {
                host: try_load("HOST", "0.0.0.0".to_string()),
                port,
                cors_allow_origin: try_load("CORS_ALLOW_ORIGIN", "*".to_string()),
            },
            auth: AuthConfig::from_env()?,
            storage: StorageConfig {
                database_url: try_load("DATABASE_URL", "sqlite://./contacts.db".to_string()),
                max_connections: try_load("DATABASE_MAX_CONNECTIONS", 5u32),
            },
            mail: MailConfig {
                sendgrid_api_key: env::var("SENDGRID_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                from: try_load("MAIL_FROM", "no-reply@contacts.local".to_string()),
                base_url: try_load("BASE_URL", format!("http://localhost:{port}")),
            },
            avatars: AvatarConfig {
                public_dir: try_load("PUBLIC_DIR", PathBuf::from("public")),
                tmp_dir: try_load("TMP_DIR", PathBuf::from("tmp")),
                size: 250,
            },
        })
    }
}

/// Read `key`, falling back to `default` when unset or unparsable
pub(crate) fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Debug,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default: {default:?}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default:?}");
            default
        }
    }
}

/// Read a variable that has no sensible default
pub(crate) fn require(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SECRET: &str = "kX9#mQ2$vL7@pR4!wZ8&nB5^hJ3*tY6%";

    fn clear() {
        for key in [
            "PORT",
            "HOST",
            "DATABASE_URL",
            "JWT_SECRET",
            "TOKEN_EXPIRY",
            "SENDGRID_API_KEY",
            "BASE_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear();
        env::set_var("JWT_SECRET", SECRET);

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.token_expiry, 3600);
        assert_eq!(config.mail.base_url, "http://localhost:3000");
        assert!(config.mail.sendgrid_api_key.is_none());
        assert_eq!(config.avatars.avatars_dir(), PathBuf::from("public/avatars"));

        clear();
    }

    #[test]
    #[serial]
    fn test_missing_secret_is_an_error() {
        clear();
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    #[serial]
    fn test_invalid_number_falls_back() {
        clear();
        env::set_var("JWT_SECRET", SECRET);
        env::set_var("PORT", "not-a-port");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.port, 3000);

        clear();
    }
}
