//! SendGrid v3 mail-send client

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use super::{ARCHIVE_MEDIA_TYPE, Notifier, NotifyError};
use crate::config::{Credentials, MailConfig};
use crate::pipeline::MashupArchive;

const MAIL_SEND_PATH: &str = "/v3/mail/send";

/// Request body for `POST /v3/mail/send`
#[derive(Debug, Clone, Serialize)]
pub struct SendGridMessage {
    pub personalizations: Vec<Personalization>,
    pub from: EmailAddress,
    pub subject: String,
    pub content: Vec<Content>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Personalization {
    pub to: Vec<EmailAddress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailAddress {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub media_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    /// Base64 of the file bytes
    pub content: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub filename: String,
    pub disposition: String,
}

pub struct SendGridNotifier {
    client: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    subject: String,
    html_body: String,
    attachment_name: String,
    max_attachment_bytes: u64,
}

impl SendGridNotifier {
    pub fn new(config: &MailConfig, credentials: Credentials) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mashup/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{MAIL_SEND_PATH}", config.api_base.trim_end_matches('/')),
            credentials,
            subject: config.subject.clone(),
            html_body: config.html_body.clone(),
            attachment_name: config.attachment_name.clone(),
            max_attachment_bytes: config.max_attachment_bytes.as_u64(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Assemble the message for `recipient` with `data` attached
    pub fn build_message(&self, recipient: &str, data: &[u8]) -> SendGridMessage {
        SendGridMessage {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: recipient.to_string(),
                }],
            }],
            from: EmailAddress {
                email: self.credentials.sender.clone(),
            },
            subject: self.subject.clone(),
            content: vec![Content {
                media_type: "text/html".to_string(),
                value: self.html_body.clone(),
            }],
            attachments: vec![Attachment {
                content: general_purpose::STANDARD.encode(data),
                media_type: ARCHIVE_MEDIA_TYPE.to_string(),
                filename: self.attachment_name.clone(),
                disposition: "attachment".to_string(),
            }],
        }
    }

    async fn send(&self, recipient: &str, archive: &MashupArchive) -> Result<(), NotifyError> {
        if !tokio::fs::try_exists(&archive.path).await? {
            return Err(NotifyError::MissingArchive(archive.path.display().to_string()));
        }

        let data = tokio::fs::read(&archive.path).await?;
        let size = data.len() as u64;
        if size > self.max_attachment_bytes {
            return Err(NotifyError::TooLarge {
                size,
                limit: self.max_attachment_bytes,
            });
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.credentials.api_key)
            .json(&self.build_message(recipient, &data))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn notify(&self, recipient: &str, archive: &MashupArchive) -> bool {
        match self.send(recipient, archive).await {
            Ok(()) => {
                info!(recipient, size = archive.size, "Mashup emailed");
                true
            }
            Err(e) => {
                warn!(recipient, error = %e, "Mashup email could not be sent");
                false
            }
        }
    }
}
