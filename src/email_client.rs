use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::domain::subscriber_email::SubscriberEmail;

const DEFAULT_TIMEOUT: time::Duration = time::Duration::from_secs(10);

/// Sender account used to authenticate against the mail API.
#[derive(Debug)]
pub struct MailCredentials {
    pub sender: SubscriberEmail,
    pub api_key: Secret<String>,
}

/// HTTP client of the transactional mail API (`POST {base_url}/mail/send`).
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    credentials: Option<MailCredentials>,
}

// Wire format of the mail API. Everything is borrowed from the caller.
#[derive(serde::Serialize)]
struct MailMessage<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(serde::Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(serde::Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(serde::Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime_type: &'a str,
    value: &'a str,
}

#[derive(thiserror::Error, Debug)]
pub enum EmailClientError {
    #[error("Mail credentials are not configured.")]
    MissingCredentials,
    #[error("The mail API request failed.")]
    Request(#[from] reqwest::Error),
}

impl EmailClient {
    /// Without credentials the client still builds, but every send fails
    /// with [`EmailClientError::MissingCredentials`].
    pub fn new(
        base_url: String,
        credentials: Option<MailCredentials>,
        timeout: Option<time::Duration>,
    ) -> Result<EmailClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(EmailClient {
            http_client,
            base_url,
            credentials,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    #[tracing::instrument(name = "Sending an email", skip(self, html_content), fields(recipient = %recipient))]
    pub async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
    ) -> Result<(), EmailClientError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(EmailClientError::MissingCredentials)?;
        let message = MailMessage {
            personalizations: [Personalization {
                to: [Address {
                    email: recipient.as_ref(),
                }],
            }],
            from: Address {
                email: credentials.sender.as_ref(),
            },
            subject,
            content: [Content {
                mime_type: "text/html",
                value: html_content,
            }],
        };

        self.http_client
            .post(format!("{}/mail/send", self.base_url))
            .bearer_auth(credentials.api_key.expose_secret())
            .json(&message)
            .send()
            .await?
            // 4xx and 5xx answers count as failed sends
            .error_for_status()?;

        Ok(())
    }
}
