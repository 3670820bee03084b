//! Outgoing mail
//!
//! [`Mailer`] is the narrow interface the account flows send through.
//! [`SendGridMailer`] talks to the SendGrid API, [`LogMailer`] only logs (used
//! when no API key is configured) and [`MemoryMailer`] records letters for tests.

pub mod sendgrid;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{config::MailConfig, errors::ApiError};

pub use sendgrid::SendGridMailer;

/// A single outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mail delivery
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, letter: Letter) -> Result<(), ApiError>;
}

/// Select the mailer for `config`: SendGrid when an API key is set, otherwise log only
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, ApiError> {
    match &config.sendgrid_api_key {
        Some(key) => {
            info!(from = %config.from, "sending mail through SendGrid");
            Ok(Arc::new(SendGridMailer::new(key.clone(), config.from.clone())?))
        }
        None => {
            warn!("SENDGRID_API_KEY not set, outgoing mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Build the email-verification letter for `to`
pub fn verification_letter(to: &str, base_url: &str, verify_token: &str) -> Letter {
    let link = format!(
        "{}/users/verify/{}",
        base_url.trim_end_matches('/'),
        verify_token
    );

    Letter {
        to: to.to_string(),
        subject: "Verify email".to_string(),
        html: format!(r#"<a target="_blank" href="{link}">Click to verify your email</a>"#),
    }
}

/// Logs letters instead of sending them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, letter: Letter) -> Result<(), ApiError> {
        info!(to = %letter.to, subject = %letter.subject, "mail delivery disabled, letter logged");
        Ok(())
    }
}

/// Records letters in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryMailer {
    letters: Arc<Mutex<Vec<Letter>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Letters sent so far, oldest first
    pub fn sent(&self) -> Vec<Letter> {
        self.letters.lock().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<Letter> {
        self.letters
            .lock()
            .iter()
            .rev()
            .find(|letter| letter.to == to)
            .cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, letter: Letter) -> Result<(), ApiError> {
        self.letters.lock().push(letter);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_letter_links_to_token() {
        let letter = verification_letter("a@x.com", "http://localhost:3000/", "abc123");

        assert_eq!(letter.to, "a@x.com");
        assert_eq!(letter.subject, "Verify email");
        assert!(letter
            .html
            .contains(r#"href="http://localhost:3000/users/verify/abc123""#));
    }

    #[tokio::test]
    async fn test_memory_mailer_records() {
        let mailer = MemoryMailer::new();
        mailer
            .send(verification_letter("a@x.com", "http://h", "t1"))
            .await
            .unwrap();
        mailer
            .send(verification_letter("b@x.com", "http://h", "t2"))
            .await
            .unwrap();

        assert_eq!(mailer.sent().len(), 2);
        assert!(mailer.last_to("a@x.com").unwrap().html.contains("t1"));
        assert!(mailer.last_to("c@x.com").is_none());
    }
}
