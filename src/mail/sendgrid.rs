//! SendGrid mail backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};
use zeroize::Zeroizing;

use super::{Letter, Mailer};
use crate::errors::ApiError;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Serialize)]
struct SendGridEmail<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridPersonalization<'a> {
    to: Vec<SendGridEmail<'a>>,
}

#[derive(Debug, Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<SendGridPersonalization<'a>>,
    from: SendGridEmail<'a>,
    subject: &'a str,
    content: Vec<SendGridContent<'a>>,
}

/// Sends mail through the SendGrid v3 API
pub struct SendGridMailer {
    api_key: Zeroizing<String>,
    from: String,
    endpoint: String,
    client: Client,
}

impl SendGridMailer {
    pub fn new(api_key: String, from: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Mailer(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key: Zeroizing::new(api_key),
            from,
            endpoint: SENDGRID_API_URL.to_string(),
            client,
        })
    }

    /// Point the mailer at a different API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body<'a>(&'a self, letter: &'a Letter) -> SendGridRequest<'a> {
        SendGridRequest {
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridEmail { email: &letter.to }],
            }],
            from: SendGridEmail { email: &self.from },
            subject: &letter.subject,
            content: vec![SendGridContent {
                content_type: "text/html",
                value: &letter.html,
            }],
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, letter: Letter) -> Result<(), ApiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.as_str())
            .json(&self.request_body(&letter))
            .send()
            .await
            .map_err(|e| ApiError::Mailer(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "sendgrid rejected letter");
            return Err(ApiError::Mailer(format!("sendgrid returned {status}: {body}")));
        }

        info!(to = %letter.to, subject = %letter.subject, "letter sent");
        Ok(())
    }
}
