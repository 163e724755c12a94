//! Outbound email for the contact form.
//!
//! Handlers depend on the `EmailSender` trait; `ResendClient` is the
//! production implementation over the Resend HTTP API.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::contact::validation::ContactSubmission;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gave up after {retries} retries")]
    Exhausted { retries: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl EmailMessage {
    /// Builds the notification sent to the site owner for one submission.
    pub fn for_submission(submission: &ContactSubmission, from: &str, to: &str) -> Self {
        let name = submission.name.trim();
        let email = submission.email.trim();
        let message = submission.message.trim();

        let html = format!(
            "<h2>New Contact Form Message</h2>\n\
             <p><strong>From:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <hr style=\"margin: 20px 0; border: none; border-top: 1px solid #e0e0e0;\" />\n\
             <p><strong>Message:</strong></p>\n\
             <p style=\"white-space: pre-wrap;\">{}</p>",
            escape_html(name),
            escape_html(email),
            escape_html(message).replace('\n', "<br>"),
        );
        let text = format!(
            "New Contact Form Message\n\nFrom: {name}\nEmail: {email}\n\nMessage:\n{message}\n"
        );

        Self {
            from: from.to_string(),
            to: vec![to.to_string()],
            reply_to: email.to_string(),
            subject: format!("New contact form message from {name}"),
            html,
            text,
        }
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResendAccepted {
    id: String,
}

#[derive(Clone)]
pub struct ResendClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ResendClient {
    pub fn new(api_key: String) -> Result<Self, MailError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_key,
            endpoint: RESEND_API_URL.to_string(),
        })
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    /// Posts the message, retrying on 429 and 5xx with exponential backoff.
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let mut last_error: Option<MailError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Email send attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(message)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(MailError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Resend API returned {}: {}", status, body);
                last_error = Some(MailError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ResendError>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                return Err(MailError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let accepted: ResendAccepted = response.json().await?;
            debug!("Email accepted by Resend: id={}", accepted.id);
            return Ok(());
        }

        Err(last_error.unwrap_or(MailError::Exhausted {
            retries: MAX_RETRIES,
        }))
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
